//! TokenGateway over KabuStation's local REST API

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

use kabuboot_core::domain::{ApiPassword, SessionToken};
use kabuboot_core::error::{AppError, Result};
use kabuboot_core::port::TokenGateway;

use crate::types::{ReqPostAuthToken, RespError, RespPostAuthToken};

/// KabuStation's production API base URL (local only)
pub const DEFAULT_BASE_URL: &str = "http://localhost:18080/kabusapi";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KabusApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for KabusApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Exchanges the API password for a session token
///
/// One request per call, no retry. Every failure mode (transport error,
/// non-2xx status, non-zero result code, empty token) collapses into
/// `AppError::Auth`.
pub struct KabusApiGateway {
    client: reqwest::Client,
    token_url: String,
}

impl KabusApiGateway {
    pub fn new(config: KabusApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            token_url: format!("{}/token", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

#[async_trait]
impl TokenGateway for KabusApiGateway {
    async fn authenticate(&self, password: &ApiPassword) -> Result<SessionToken> {
        // Blank password: reject before touching the network
        let password = password
            .validate()
            .map_err(|e| AppError::Auth(e.to_string()))?;

        debug!(url = %self.token_url, "Requesting session token");

        let response = self
            .client
            .post(&self.token_url)
            .json(&ReqPostAuthToken {
                api_password: password,
            })
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<RespError>(&body) {
                Ok(err) => format!("code {}: {}", err.code, err.message),
                Err(_) => body.trim().to_string(),
            };
            warn!(status = status.as_u16(), "Token request rejected");
            return Err(AppError::Auth(format!(
                "HTTP {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let body: RespPostAuthToken = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("unreadable token response: {}", e)))?;

        if body.result_code != 0 {
            return Err(AppError::Auth(format!(
                "token request returned result code {}",
                body.result_code
            )));
        }

        let token = SessionToken::new(body.token)
            .map_err(|_| AppError::Auth("API returned an empty token".to_string()))?;

        info!("Session token issued");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct FakeApi {
        status: StatusCode,
        body: Value,
        hits: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<Value>>>,
    }

    async fn token_handler(
        State(api): State<FakeApi>,
        Json(request): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        api.hits.fetch_add(1, Ordering::SeqCst);
        *api.last_request.lock().unwrap() = Some(request);
        (api.status, Json(api.body.clone()))
    }

    /// Fake KabuStation API on an ephemeral port; returns its base URL
    async fn spawn_fake(status: StatusCode, body: Value) -> (String, FakeApi) {
        let api = FakeApi {
            status,
            body,
            hits: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        };
        let app = Router::new()
            .route("/kabusapi/token", post(token_handler))
            .with_state(api.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/kabusapi", addr), api)
    }

    fn gateway(base_url: String) -> KabusApiGateway {
        KabusApiGateway::new(KabusApiConfig {
            base_url,
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_token_and_sends_password() {
        let (url, api) = spawn_fake(StatusCode::OK, json!({"ResultCode": 0, "Token": "abc123"})).await;

        let token = gateway(url)
            .authenticate(&ApiPassword::new("pw"))
            .await
            .unwrap();

        assert_eq!(token.expose(), "abc123");
        assert_eq!(api.hits.load(Ordering::SeqCst), 1);
        assert_eq!(
            api.last_request.lock().unwrap().clone(),
            Some(json!({"APIPassword": "pw"}))
        );
    }

    #[tokio::test]
    async fn test_blank_password_sends_nothing() {
        let (url, api) = spawn_fake(StatusCode::OK, json!({"ResultCode": 0, "Token": "abc"})).await;

        let err = gateway(url)
            .authenticate(&ApiPassword::new(" \n "))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Auth(_)));
        assert_eq!(api.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_2xx_is_auth_error_with_api_message() {
        let (url, _api) = spawn_fake(
            StatusCode::BAD_REQUEST,
            json!({"Code": 4001007, "Message": "ログイン認証エラー"}),
        )
        .await;

        let err = gateway(url)
            .authenticate(&ApiPassword::new("wrong"))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, AppError::Auth(_)));
        assert!(message.contains("HTTP 400"));
        assert!(message.contains("4001007"));
    }

    #[tokio::test]
    async fn test_empty_token_is_auth_error() {
        let (url, _api) = spawn_fake(StatusCode::OK, json!({"ResultCode": 0, "Token": ""})).await;

        let err = gateway(url)
            .authenticate(&ApiPassword::new("pw"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("empty token"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_auth_error() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = gateway(format!("http://{}/kabusapi", addr))
            .authenticate(&ApiPassword::new("pw"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_token_url_joins_base() {
        let gw = gateway("http://localhost:18080/kabusapi/".to_string());
        assert_eq!(gw.token_url(), "http://localhost:18080/kabusapi/token");
    }
}
