// Action outcomes reported back to the operator

use crate::error::AppError;
use serde::Serialize;
use std::fmt;

/// The two applications this panel boots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Kabus,
    TradeApp,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Kabus => f.write_str("KabuStation"),
            TargetKind::TradeApp => f.write_str("TradeApp"),
        }
    }
}

/// Successful action outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootReport {
    pub message: String,
    pub pid: Option<u32>,
    pub pids: Option<Vec<u32>>,
    pub started: Option<bool>,
    pub output: Option<String>,
    pub url: Option<String>,
}

impl BootReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Failed action outcome, with whatever context was gathered before failing
#[derive(Debug)]
pub struct BootFailure {
    pub message: String,
    pub error: AppError,
    pub pid: Option<u32>,
    pub started: Option<bool>,
    pub output: Option<String>,
    pub url: Option<String>,
}

impl BootFailure {
    pub fn new(message: impl Into<String>, error: AppError) -> Self {
        let output = error.output().map(str::to_string);
        Self {
            message: message.into(),
            error,
            pid: None,
            started: None,
            output,
            url: None,
        }
    }

    pub fn with_pid(mut self, pid: Option<u32>) -> Self {
        self.pid = pid;
        self
    }

    pub fn with_started(mut self, started: bool) -> Self {
        self.started = Some(started);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Last-known PID of one target plus a fresh liveness probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PidEntry {
    pub pid: Option<u32>,
    pub alive: bool,
}

/// `/pid` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PidReport {
    pub kabus: PidEntry,
    pub tradeapp: PidEntry,
}
