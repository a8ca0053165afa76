// Boot orchestration - KabuStation login, token handoff, TradeApp launch
//
// Three operator actions, each a single linear attempt:
// - authenticate_kabus: start KabuStation if needed, then drive its login window
// - authenticate_api:   exchange the API password for a session token
// - launch_trade_app:   start TradeApp with the stored token and check it survives

pub mod api_auth;
pub mod authenticate;
pub mod constants;
pub mod launch_app;
pub mod resolve;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::application::{PidBook, TokenStore};
use crate::domain::{ApiPassword, BootFailure, BootReport, PidEntry, PidReport, TargetKind, TargetSpec};
use crate::port::{Delay, ProcessLauncher, ProcessProbe, ScriptRunner, TokenGateway};

use constants::{
    DEFAULT_CONF_FLAG, DEFAULT_KABUS_SETTLE, DEFAULT_LOGIN_SCRIPT, DEFAULT_SCRIPT_TIMEOUT,
    DEFAULT_TOKEN_FLAG, DEFAULT_TRADE_APP_SETTLE,
};

/// Outcome of one orchestrated action
pub type ActionResult = std::result::Result<BootReport, BootFailure>;

/// Settle delays and the script timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootTiming {
    pub kabus_settle: Duration,
    pub trade_app_settle: Duration,
    pub script_timeout: Duration,
}

impl Default for BootTiming {
    fn default() -> Self {
        Self {
            kabus_settle: DEFAULT_KABUS_SETTLE,
            trade_app_settle: DEFAULT_TRADE_APP_SETTLE,
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
        }
    }
}

/// How TradeApp is found and started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeAppSettings {
    pub target: TargetSpec,
    pub config_file: Option<PathBuf>,
    pub conf_flag: String,
    pub token_flag: String,
    /// Opened in the browser when no executable is configured at all
    pub fallback_url: Option<String>,
}

impl Default for TradeAppSettings {
    fn default() -> Self {
        Self {
            target: TargetSpec::new(TargetKind::TradeApp.to_string()),
            config_file: None,
            conf_flag: DEFAULT_CONF_FLAG.to_string(),
            token_flag: DEFAULT_TOKEN_FLAG.to_string(),
            fallback_url: None,
        }
    }
}

/// Everything the orchestrator reads from configuration
#[derive(Debug, Clone)]
pub struct BootSettings {
    pub kabus: TargetSpec,
    pub login_script: PathBuf,
    pub api_password: ApiPassword,
    pub trade_app: TradeAppSettings,
    pub timing: BootTiming,
}

impl Default for BootSettings {
    fn default() -> Self {
        Self {
            kabus: TargetSpec::new(TargetKind::Kabus.to_string()),
            login_script: PathBuf::from(DEFAULT_LOGIN_SCRIPT),
            api_password: ApiPassword::default(),
            trade_app: TradeAppSettings::default(),
            timing: BootTiming::default(),
        }
    }
}

/// Adapters the orchestrator drives
#[derive(Clone)]
pub struct BootPorts {
    pub probe: Arc<dyn ProcessProbe>,
    pub launcher: Arc<dyn ProcessLauncher>,
    pub script_runner: Arc<dyn ScriptRunner>,
    pub token_gateway: Arc<dyn TokenGateway>,
    pub delay: Arc<dyn Delay>,
}

/// Boot orchestrator
///
/// Holds no lock across an action. Two overlapping `authenticate_kabus` calls
/// can both see "not running" and launch KabuStation twice; the panel has a
/// single operator, so this race is accepted.
pub struct BootOrchestrator {
    probe: Arc<dyn ProcessProbe>,
    launcher: Arc<dyn ProcessLauncher>,
    script_runner: Arc<dyn ScriptRunner>,
    token_gateway: Arc<dyn TokenGateway>,
    delay: Arc<dyn Delay>,
    token_store: Arc<TokenStore>,
    pid_book: PidBook,
    settings: BootSettings,
}

impl BootOrchestrator {
    /// Create a new orchestrator
    ///
    /// # Example
    /// ```ignore
    /// let orchestrator = BootOrchestrator::new(ports, Arc::new(TokenStore::new()), settings);
    /// let report = orchestrator.authenticate_kabus().await;
    /// ```
    pub fn new(ports: BootPorts, token_store: Arc<TokenStore>, settings: BootSettings) -> Self {
        Self {
            probe: ports.probe,
            launcher: ports.launcher,
            script_runner: ports.script_runner,
            token_gateway: ports.token_gateway,
            delay: ports.delay,
            token_store,
            pid_book: PidBook::new(),
            settings,
        }
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.token_store
    }

    /// Last-known PIDs, each re-probed for liveness
    pub async fn pid_report(&self) -> PidReport {
        PidReport {
            kabus: self.pid_entry(TargetKind::Kabus).await,
            tradeapp: self.pid_entry(TargetKind::TradeApp).await,
        }
    }

    async fn pid_entry(&self, kind: TargetKind) -> PidEntry {
        let pid = self.pid_book.last(kind);
        let alive = match pid {
            Some(pid) => self.probe.is_alive(pid).await,
            None => false,
        };
        PidEntry { pid, alive }
    }
}
