//! HTTP Handlers
//!
//! One handler per operator action. Actions run in their own tokio task:
//! a client that disconnects mid-request does not cancel a spawn or a script
//! that is already under way, and a panic inside an action comes back as an
//! `ok: false` response instead of taking the connection down.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::Json;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

use kabuboot_core::application::{ActionResult, BootOrchestrator};
use kabuboot_core::domain::PidReport;

use crate::error::status_for;
use crate::types::ApiResponse;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const INDEX_JS: &str = include_str!("../assets/index.js");

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BootOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<BootOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/index.js
pub async fn index_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        INDEX_JS,
    )
}

/// GET /bootauthkabus
pub async fn boot_auth_kabus(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse>) {
    run_action(state, "bootauthkabus", |o| async move {
        o.authenticate_kabus().await
    })
    .await
}

/// GET /apiauth
pub async fn api_auth(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse>) {
    run_action(state, "apiauth", |o| async move { o.authenticate_api().await }).await
}

/// GET /bootapp
pub async fn boot_app(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse>) {
    run_action(state, "bootapp", |o| async move { o.launch_trade_app().await }).await
}

/// GET /pid
pub async fn pid(State(state): State<AppState>) -> Json<PidReport> {
    Json(state.orchestrator.pid_report().await)
}

/// Run one action detached from the request future and map its outcome
async fn run_action<F, Fut>(
    state: AppState,
    action: &'static str,
    f: F,
) -> (StatusCode, Json<ApiResponse>)
where
    F: FnOnce(Arc<BootOrchestrator>) -> Fut,
    Fut: Future<Output = ActionResult> + Send + 'static,
{
    info!(action = action, "Action requested");

    let task = tokio::spawn(f(state.orchestrator.clone()));

    match task.await {
        Ok(Ok(report)) => {
            info!(action = action, pid = ?report.pid, started = ?report.started, "Action succeeded");
            (StatusCode::OK, Json(ApiResponse::success(report)))
        }
        Ok(Err(failure)) => {
            let status = status_for(&failure.error);
            warn!(
                action = action,
                code = failure.error.code(),
                error = %failure.error,
                "Action failed"
            );
            (status, Json(ApiResponse::failure(failure)))
        }
        Err(e) => {
            error!(action = action, error = %e, "Action task aborted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::internal("Action aborted unexpectedly", e.to_string())),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::create_router;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use kabuboot_core::application::{
        BootPorts, BootSettings, BootTiming, TokenStore, TradeAppSettings,
    };
    use kabuboot_core::domain::{ApiPassword, SessionToken, TargetSpec};
    use kabuboot_core::port::delay::mocks::RecordingDelay;
    use kabuboot_core::port::process_launcher::mocks::{MockLaunchBehavior, MockProcessLauncher};
    use kabuboot_core::port::process_probe::mocks::MockProcessProbe;
    use kabuboot_core::port::script_runner::mocks::MockScriptRunner;
    use kabuboot_core::port::token_gateway::mocks::MockTokenGateway;
    use kabuboot_core::port::TokenGateway;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct PanickingGateway;

    #[async_trait]
    impl TokenGateway for PanickingGateway {
        async fn authenticate(
            &self,
            _password: &ApiPassword,
        ) -> kabuboot_core::Result<SessionToken> {
            panic!("gateway blew up");
        }
    }

    struct Harness {
        _dir: TempDir,
        probe: MockProcessProbe,
        launcher: MockProcessLauncher,
        token_store: Arc<TokenStore>,
        router: Router,
    }

    fn harness_with(script_runner: MockScriptRunner, gateway: Arc<dyn TokenGateway>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let kabus_exe = dir.path().join("KabuS.exe");
        let script = dir.path().join("login.ps1");
        let trade_exe = dir.path().join("tradeapp.exe");
        for path in [&kabus_exe, &script, &trade_exe] {
            std::fs::write(path, b"").unwrap();
        }

        let settings = BootSettings {
            kabus: TargetSpec::new("KabuStation").candidate(kabus_exe),
            login_script: script,
            api_password: ApiPassword::new("secret"),
            trade_app: TradeAppSettings {
                target: TargetSpec::new("TradeApp").candidate(trade_exe),
                ..Default::default()
            },
            timing: BootTiming::default(),
        };

        let probe = MockProcessProbe::new();
        let launcher = MockProcessLauncher::new_surviving().with_probe(probe.clone());
        let token_store = Arc::new(TokenStore::new());
        let orchestrator = BootOrchestrator::new(
            BootPorts {
                probe: Arc::new(probe.clone()),
                launcher: Arc::new(launcher.clone()),
                script_runner: Arc::new(script_runner),
                token_gateway: gateway,
                delay: Arc::new(RecordingDelay::new()),
            },
            token_store.clone(),
            settings,
        );

        Harness {
            _dir: dir,
            probe,
            launcher,
            token_store,
            router: create_router(AppState::new(Arc::new(orchestrator))),
        }
    }

    fn harness() -> Harness {
        harness_with(
            MockScriptRunner::new_success(),
            Arc::new(MockTokenGateway::new_tokens(["tok-1"])),
        )
    }

    async fn get(router: &Router, path: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_index_page_served() {
        let h = harness();
        let response = h
            .router
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("btn-bootauthkabus"));
        assert!(html.contains("/static/index.js"));
    }

    #[tokio::test]
    async fn test_script_asset_content_type() {
        let h = harness();
        let response = h
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/static/index.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/javascript; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_bootapp_without_token_is_bad_request_and_launches_nothing() {
        let h = harness();

        let (status, body) = get(&h.router, "/bootapp").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "NOT_AUTHENTICATED");
        assert!(body["error"].is_string());
        assert_eq!(h.launcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_apiauth_then_bootapp() {
        let h = harness();

        let (status, body) = get(&h.router, "/apiauth").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert!(body.get("error").is_none());
        assert_eq!(h.token_store.get().unwrap().expose(), "tok-1");

        let (status, body) = get(&h.router, "/bootapp").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert!(body["pid"].is_u64());

        let spec = h.launcher.launches().pop().unwrap();
        assert_eq!(spec.args[spec.args.len() - 2..], ["--token", "tok-1"]);
    }

    #[tokio::test]
    async fn test_bootauthkabus_when_already_running() {
        let h = harness();
        h.probe.add_process("KabuS.exe", 777);

        let (status, body) = get(&h.router, "/bootauthkabus").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["started"], false);
        assert_eq!(body["pids"], serde_json::json!([777]));
        assert_eq!(h.launcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_script_failure_reports_output_and_started() {
        let h = harness_with(
            MockScriptRunner::new_fail("script exited with exit status: 1", "login window not found"),
            Arc::new(MockTokenGateway::new_tokens(["tok-1"])),
        );

        let (status, body) = get(&h.router, "/bootauthkabus").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "SCRIPT_ERROR");
        assert_eq!(body["started"], true);
        assert_eq!(body["output"], "login window not found");
    }

    #[tokio::test]
    async fn test_auth_failure_is_bad_gateway() {
        let h = harness_with(
            MockScriptRunner::new_success(),
            Arc::new(MockTokenGateway::new_fail("HTTP 401: invalid password")),
        );

        let (status, body) = get(&h.router, "/apiauth").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "AUTH_ERROR");
        assert!(h.token_store.get().is_none());
    }

    #[tokio::test]
    async fn test_panicking_action_becomes_error_response() {
        let h = harness_with(MockScriptRunner::new_success(), Arc::new(PanickingGateway));

        let (status, body) = get(&h.router, "/apiauth").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
        assert_eq!(body["code"], "INTERNAL_ERROR");

        // Server keeps serving after the panic
        let (status, _) = get(&h.router, "/pid").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_pid_reports_last_known_and_liveness() {
        let h = harness();
        h.token_store.set(SessionToken::new("tok-9").unwrap());
        h.launcher.set_behavior(MockLaunchBehavior::ExitImmediately);

        let (_, boot) = get(&h.router, "/bootapp").await;
        assert_eq!(boot["ok"], false);
        assert_eq!(boot["code"], "CRASHED_IMMEDIATELY");
        let crashed_pid = boot["pid"].clone();

        let (status, body) = get(&h.router, "/pid").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kabus"], serde_json::json!({"pid": null, "alive": false}));
        assert_eq!(body["tradeapp"]["pid"], crashed_pid);
        assert_eq!(body["tradeapp"]["alive"], false);
    }
}
