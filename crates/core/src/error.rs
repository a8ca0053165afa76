// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Every orchestrated action fails with exactly one of these. Only `Config`
/// is allowed to terminate the process (at startup).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Launch error: {0}")]
    Launch(String),

    #[error("Script error: {reason}")]
    Script {
        reason: String,
        output: Option<String>,
    },

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error("Process {pid} exited immediately after launch")]
    CrashedImmediately { pid: u32 },
}

impl AppError {
    /// Stable machine-readable code, surfaced to the operator page
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Resolution(_) => "RESOLUTION_ERROR",
            AppError::Probe(_) => "PROBE_ERROR",
            AppError::Launch(_) => "LAUNCH_ERROR",
            AppError::Script { .. } => "SCRIPT_ERROR",
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::NotAuthenticated(_) => "NOT_AUTHENTICATED",
            AppError::CrashedImmediately { .. } => "CRASHED_IMMEDIATELY",
        }
    }

    /// Captured tool output attached to the error, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            AppError::Script { output, .. } => output.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
