//! Configuration loading
//!
//! `auth.toml` (or the `-c` path) layered with `KABUBOOT__SECTION__KEY`
//! environment overrides. Section and key names are accepted upper- or
//! lower-case. Path values go through `shellexpand` (`~`, `$VAR`).

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kabuboot_api_http::HttpServerConfig;
use kabuboot_core::application::boot::constants::{
    DEFAULT_CONF_FLAG, DEFAULT_LOGIN_SCRIPT, DEFAULT_TOKEN_FLAG, DEFAULT_TRADE_WEB_URL,
};
use kabuboot_core::application::{BootSettings, BootTiming, TradeAppSettings};
use kabuboot_core::domain::{ApiPassword, TargetKind, TargetSpec};
use kabuboot_infra_kabusapi::client::DEFAULT_BASE_URL;
use kabuboot_infra_kabusapi::KabusApiConfig;
use kabuboot_infra_system::ScriptRunnerConfig;

const ENV_PREFIX: &str = "KABUBOOT";

// Executable fallbacks consulted after the config file
const ENV_KABUSTATION_EXE: &str = "KABUSTATION_EXE";
const ENV_TRADEAPP_EXE: &str = "TRADEAPP_EXE";
const ENV_TRADEWEBAPP_URL: &str = "TRADEWEBAPP_URL";
const ENV_LOCALAPPDATA: &str = "LOCALAPPDATA";

const DEFAULT_TERMINAL_SETTLE_MS: u64 = 10_000;
const DEFAULT_CLIENT_SETTLE_MS: u64 = 500;
const DEFAULT_SCRIPT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SCRIPT_GRACE_SECS: u64 = 15;
const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// File layout
// ============================================================================

#[derive(Default, Deserialize)]
struct RawConfig {
    #[serde(rename = "SYSTEM", alias = "system", default)]
    system: SystemSection,
    #[serde(rename = "KABUS", alias = "kabus", default)]
    kabus: KabusSection,
    #[serde(rename = "TRADEAPP", alias = "tradeapp", default)]
    tradeapp: TradeAppSection,
    #[serde(rename = "TIMING", alias = "timing", default)]
    timing: TimingSection,
    #[serde(rename = "SCRIPT", alias = "script", default)]
    script: ScriptSection,
}

#[derive(Default, Deserialize)]
struct SystemSection {
    #[serde(rename = "APIPW", alias = "apipw", default)]
    apipw: String,
    #[serde(rename = "DEBUG", alias = "debug", default)]
    debug: bool,
    #[serde(rename = "LISTEN", alias = "listen")]
    listen: Option<String>,
    #[serde(rename = "LOG_DIR", alias = "log_dir")]
    log_dir: Option<String>,
}

#[derive(Default, Deserialize)]
struct KabusSection {
    #[serde(rename = "PATH", alias = "path")]
    path: Option<String>,
    #[serde(rename = "IMAGE", alias = "image")]
    image: Option<String>,
    #[serde(rename = "API_URL", alias = "api_url")]
    api_url: Option<String>,
    #[serde(rename = "API_TIMEOUT_SECS", alias = "api_timeout_secs")]
    api_timeout_secs: Option<u64>,
    #[serde(rename = "SCRIPT", alias = "script")]
    script: Option<String>,
}

#[derive(Default, Deserialize)]
struct TradeAppSection {
    #[serde(rename = "PATH", alias = "path")]
    path: Option<String>,
    #[serde(rename = "CONF", alias = "conf")]
    conf: Option<String>,
    #[serde(rename = "WORKDIR", alias = "workdir")]
    workdir: Option<String>,
    #[serde(rename = "ARGS", alias = "args", default)]
    args: Vec<String>,
    #[serde(rename = "CONF_FLAG", alias = "conf_flag")]
    conf_flag: Option<String>,
    #[serde(rename = "TOKEN_FLAG", alias = "token_flag")]
    token_flag: Option<String>,
    #[serde(rename = "URL", alias = "url")]
    url: Option<String>,
}

#[derive(Default, Deserialize)]
struct TimingSection {
    #[serde(rename = "TERMINAL_SETTLE_MS", alias = "terminal_settle_ms")]
    terminal_settle_ms: Option<u64>,
    #[serde(rename = "CLIENT_SETTLE_MS", alias = "client_settle_ms")]
    client_settle_ms: Option<u64>,
    #[serde(rename = "SCRIPT_TIMEOUT_SECS", alias = "script_timeout_secs")]
    script_timeout_secs: Option<u64>,
    #[serde(rename = "SCRIPT_GRACE_SECS", alias = "script_grace_secs")]
    script_grace_secs: Option<u64>,
}

#[derive(Default, Deserialize)]
struct ScriptSection {
    #[serde(rename = "INTERPRETER", alias = "interpreter")]
    interpreter: Option<String>,
    #[serde(rename = "ARGS", alias = "args")]
    args: Option<Vec<String>>,
    #[serde(rename = "CAPTURE_OUTPUT", alias = "capture_output")]
    capture_output: Option<bool>,
}

// ============================================================================
// Resolved settings
// ============================================================================

/// Everything the daemon wires from configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub boot: BootSettings,
    pub server: HttpServerConfig,
    pub debug: bool,
    pub log_dir: Option<PathBuf>,
    pub kabus_api: KabusApiConfig,
    pub script: ScriptRunnerConfig,
}

/// Load settings from `path`, with executable fallbacks read from the process environment
pub fn load(path: &Path) -> Result<Settings> {
    load_with_env(path, |key| std::env::var(key).ok())
}

/// Load settings with an injected environment lookup for the executable fallbacks
pub fn load_with_env<E>(path: &Path, env: E) -> Result<Settings>
where
    E: Fn(&str) -> Option<String>,
{
    load_layered(path, env, None)
}

/// `overrides` replaces the process environment as the `KABUBOOT__*` source
fn load_layered<E>(path: &Path, env: E, overrides: Option<Map<String, String>>) -> Result<Settings>
where
    E: Fn(&str) -> Option<String>,
{
    // Values stay strings until serde sees the target field (passwords may be all digits)
    let raw: RawConfig = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(overrides),
        )
        .build()
        .with_context(|| format!("failed to read configuration {}", path.display()))?
        .try_deserialize()
        .with_context(|| format!("invalid configuration in {}", path.display()))?;

    resolve(raw, &env)
}

fn resolve<E>(raw: RawConfig, env: &E) -> Result<Settings>
where
    E: Fn(&str) -> Option<String>,
{
    let timing = &raw.timing;
    let script_timeout = Duration::from_secs(
        timing
            .script_timeout_secs
            .unwrap_or(DEFAULT_SCRIPT_TIMEOUT_SECS),
    );
    let script_grace =
        Duration::from_secs(timing.script_grace_secs.unwrap_or(DEFAULT_SCRIPT_GRACE_SECS));

    let boot_timing = BootTiming {
        kabus_settle: Duration::from_millis(
            timing
                .terminal_settle_ms
                .unwrap_or(DEFAULT_TERMINAL_SETTLE_MS),
        ),
        trade_app_settle: Duration::from_millis(
            timing.client_settle_ms.unwrap_or(DEFAULT_CLIENT_SETTLE_MS),
        ),
        script_timeout,
    };

    // KabuStation: KABUS.PATH -> $KABUSTATION_EXE -> %LOCALAPPDATA%/kabuStation/KabuS.exe
    let mut kabus = TargetSpec::new(TargetKind::Kabus.to_string());
    if let Some(path) = non_empty(raw.kabus.path.as_deref()) {
        kabus = kabus.candidate(expand(path)?);
    }
    if let Some(path) = env(ENV_KABUSTATION_EXE).as_deref().and_then(|p| non_empty(Some(p))) {
        kabus = kabus.candidate(expand(path)?);
    }
    if let Some(dir) = env(ENV_LOCALAPPDATA).as_deref().and_then(|d| non_empty(Some(d))) {
        kabus = kabus.candidate(Path::new(dir).join("kabuStation").join("KabuS.exe"));
    }
    if let Some(image) = non_empty(raw.kabus.image.as_deref()) {
        kabus = kabus.image_name(image);
    }

    let login_script = match non_empty(raw.kabus.script.as_deref()) {
        Some(script) => expand(script)?,
        None => PathBuf::from(DEFAULT_LOGIN_SCRIPT),
    };

    // TradeApp: TRADEAPP.PATH -> $TRADEAPP_EXE
    let trade = &raw.tradeapp;
    let mut trade_target = TargetSpec::new(TargetKind::TradeApp.to_string()).args(trade.args.clone());
    if let Some(path) = non_empty(trade.path.as_deref()) {
        trade_target = trade_target.candidate(expand(path)?);
    }
    if let Some(path) = env(ENV_TRADEAPP_EXE).as_deref().and_then(|p| non_empty(Some(p))) {
        trade_target = trade_target.candidate(expand(path)?);
    }
    if let Some(dir) = non_empty(trade.workdir.as_deref()) {
        trade_target = trade_target.working_dir(expand(dir)?);
    }

    // Browser fallback: TRADEAPP.URL -> $TRADEWEBAPP_URL -> local dev server
    let fallback_url = non_empty(trade.url.as_deref())
        .map(str::to_string)
        .or_else(|| env(ENV_TRADEWEBAPP_URL).filter(|u| !u.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_TRADE_WEB_URL.to_string());

    let config_file = non_empty(trade.conf.as_deref()).map(expand).transpose()?;

    let trade_app = TradeAppSettings {
        target: trade_target,
        config_file,
        conf_flag: non_empty(trade.conf_flag.as_deref())
            .unwrap_or(DEFAULT_CONF_FLAG)
            .to_string(),
        token_flag: non_empty(trade.token_flag.as_deref())
            .unwrap_or(DEFAULT_TOKEN_FLAG)
            .to_string(),
        fallback_url: Some(fallback_url),
    };

    let script_defaults = ScriptRunnerConfig::default();
    let script = ScriptRunnerConfig {
        interpreter: non_empty(raw.script.interpreter.as_deref())
            .map(str::to_string)
            .unwrap_or(script_defaults.interpreter),
        interpreter_args: raw
            .script
            .args
            .clone()
            .unwrap_or(script_defaults.interpreter_args),
        capture_output: raw
            .script
            .capture_output
            .unwrap_or(script_defaults.capture_output),
        timeout: Some(script_timeout + script_grace),
    };

    let kabus_api = KabusApiConfig {
        base_url: non_empty(raw.kabus.api_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string(),
        request_timeout: Duration::from_secs(
            raw.kabus
                .api_timeout_secs
                .unwrap_or(DEFAULT_API_TIMEOUT_SECS),
        ),
    };

    let server = match non_empty(raw.system.listen.as_deref()) {
        Some(listen) => HttpServerConfig {
            listen: listen.to_string(),
        },
        None => HttpServerConfig::default(),
    };

    let log_dir = non_empty(raw.system.log_dir.as_deref())
        .map(expand)
        .transpose()?;

    Ok(Settings {
        boot: BootSettings {
            kabus,
            login_script,
            api_password: ApiPassword::new(raw.system.apipw),
            trade_app,
            timing: boot_timing,
        },
        server,
        debug: raw.system.debug,
        log_dir,
        kabus_api,
        script,
    })
}

/// Blank values count as unset
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn expand(raw: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(raw).with_context(|| format!("cannot expand path {}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
