//! Logging setup
//!
//! Console output (pretty by default, JSON lines with `KABUBOOT_LOG_FORMAT=json`)
//! plus an optional daily-rolling file under `SYSTEM.LOG_DIR`.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: full filter override (e.g. `kabuboot=trace,tower_http=debug`)
//! - `KABUBOOT_LOG_FORMAT`: `json` or `pretty`

use std::path::Path;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

const LOG_FILE_PREFIX: &str = "kabuboot.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Default filter when `RUST_LOG` is unset
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "kabuboot=debug,tower_http=debug"
    } else {
        "kabuboot=info,tower_http=info"
    }
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init(debug: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let json = std::env::var("KABUBOOT_LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    if json {
        // Production: JSON structured logging
        layers.push(fmt::layer().json().boxed());
    } else {
        // Development: human-readable
        layers.push(fmt::layer().pretty().boxed());
    }

    let mut file_error = None;
    let guard = match log_dir.map(file_appender) {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(fmt::layer().with_writer(writer).with_ansi(false).boxed());
            Some(guard)
        }
        Some(Err(e)) => {
            file_error = Some(e);
            None
        }
        None => None,
    };

    let installed = tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init();
    if let Err(e) = installed {
        eprintln!("logging already initialised: {}", e);
    }

    if let (Some(dir), Some(e)) = (log_dir, file_error) {
        warn!(log_dir = %dir.display(), error = %e, "File logging disabled, console only");
    }

    guard
}

/// Daily-rolling appender under `dir`, creating the directory if needed
///
/// Fails instead of panicking when the directory or the first file cannot be created.
fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
}
