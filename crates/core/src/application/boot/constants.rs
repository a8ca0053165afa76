// Boot constants (no magic values)
// Defaults observed for KabuStation's cold start; all overridable from config.
use std::time::Duration;

/// Wait after launching KabuStation before driving its login window (10s)
pub const DEFAULT_KABUS_SETTLE: Duration = Duration::from_secs(10);

/// Wait after launching TradeApp before the survival check (500ms)
pub const DEFAULT_TRADE_APP_SETTLE: Duration = Duration::from_millis(500);

/// Timeout handed to the login script, which enforces it itself (60s)
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Login automation script, relative to the working directory
pub const DEFAULT_LOGIN_SCRIPT: &str = "cmd/Click-KabuStationLogin.ps1";

/// Browser fallback when no TradeApp executable is configured
pub const DEFAULT_TRADE_WEB_URL: &str = "http://localhost:5173/";

/// TradeApp flag preceding its configuration file path
pub const DEFAULT_CONF_FLAG: &str = "--config";

/// TradeApp flag preceding the session token
pub const DEFAULT_TOKEN_FLAG: &str = "--token";
