//! HTTP Response Types
//!
//! Every action endpoint answers with `ApiResponse`:
//! `{ok, message, error?, code?, pid?, pids?, started?, output?, url?}`.

use kabuboot_core::domain::{BootFailure, BootReport};
use serde::Serialize;

/// Uniform action response envelope
///
/// Built only through `success` / `failure`, so an `ok: true` response can
/// never carry `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable error code (`NOT_AUTHENTICATED`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pids: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<bool>,
    /// Captured script output, for troubleshooting on the local machine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ApiResponse {
    pub fn success(report: BootReport) -> Self {
        Self {
            ok: true,
            message: report.message,
            error: None,
            code: None,
            pid: report.pid,
            pids: report.pids,
            started: report.started,
            output: report.output,
            url: report.url,
        }
    }

    pub fn failure(failure: BootFailure) -> Self {
        Self {
            ok: false,
            message: failure.message,
            error: Some(failure.error.to_string()),
            code: Some(failure.error.code()),
            pid: failure.pid,
            pids: None,
            started: failure.started,
            output: failure.output,
            url: failure.url,
        }
    }

    /// Failure that never reached the orchestrator boundary (e.g. a panicked task)
    pub fn internal(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            error: Some(error.into()),
            code: Some("INTERNAL_ERROR"),
            pid: None,
            pids: None,
            started: None,
            output: None,
            url: None,
        }
    }
}
