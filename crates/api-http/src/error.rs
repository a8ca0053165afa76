//! HTTP Error Mapping
//!
//! Maps application errors to HTTP status codes. The body is always the
//! uniform `ApiResponse` envelope; the status only helps generic clients.

use axum::http::StatusCode;
use kabuboot_core::error::AppError;

/// Status code for a failed action
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::NotAuthenticated(_) => StatusCode::BAD_REQUEST,
        AppError::Auth(_) => StatusCode::BAD_GATEWAY,
        AppError::Config(_)
        | AppError::Resolution(_)
        | AppError::Probe(_)
        | AppError::Launch(_)
        | AppError::Script { .. }
        | AppError::CrashedImmediately { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&AppError::NotAuthenticated("no token".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AppError::Auth("HTTP 401".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AppError::CrashedImmediately { pid: 7 }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&AppError::Script {
                reason: "timed out".into(),
                output: None
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
