//! Shared test fixtures: a fake KabuStation API and throwaway executables

#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-process stand-in for KabuStation's `/kabusapi/token`
///
/// Accepts exactly one password and hands out `token-1`, `token-2`, ...
pub struct FakeKabusApi {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

#[derive(Clone)]
struct FakeState {
    password: String,
    hits: Arc<AtomicUsize>,
}

async fn token(State(state): State<FakeState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let n = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    if body["APIPassword"] == state.password.as_str() {
        (
            StatusCode::OK,
            Json(json!({"ResultCode": 0, "Token": format!("token-{}", n)})),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"Code": 4001009, "Message": "API password mismatch"})),
        )
    }
}

impl FakeKabusApi {
    pub async fn start(password: &str) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/kabusapi/token", post(token))
            .with_state(FakeState {
                password: password.to_string(),
                hits: hits.clone(),
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/kabusapi", addr),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Write an executable `#!/bin/sh` script
#[cfg(unix)]
pub fn write_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Short image name unique to this test process (the kernel truncates names at 15 bytes)
pub fn unique_image(tag: &str) -> String {
    format!("kb{}{}", tag, std::process::id())
}

/// Poll until `path` exists with content, or give up after ~2s
pub async fn wait_for_file(path: &Path) -> String {
    for _ in 0..100 {
        if let Ok(content) = std::fs::read_to_string(path) {
            if !content.is_empty() {
                return content;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("{} was never written", path.display());
}

pub fn kill(pid: u32) {
    let _ = std::process::Command::new("kill")
        .arg("-9")
        .arg(pid.to_string())
        .status();
}
