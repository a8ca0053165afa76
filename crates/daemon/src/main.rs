//! kabuboot - Main Entry Point
//!
//! Local boot panel: start KabuStation and drive its login window, exchange
//! the API password for a session token, and start TradeApp with that token.

mod logging;
mod settings;

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

// Import workspace crates
use kabuboot_api_http::HttpServer;
use kabuboot_core::application::{BootOrchestrator, BootPorts, TokenStore};
use kabuboot_core::port::TokioDelay;
use kabuboot_infra_kabusapi::KabusApiGateway;
use kabuboot_infra_system::{default_probe, DetachedLauncher, InterpreterScriptRunner};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Boot panel for KabuStation and TradeApp
#[derive(Parser, Debug)]
#[command(name = "kabuboot", version, about)]
struct Args {
    /// Configuration file
    #[arg(short = 'c', long = "config", env = "KABUBOOT_CONFIG", default_value = "auth.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load configuration (the only fatal error path)
    let settings = match settings::load(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            let _guard = logging::init(false, None);
            error!(config = %args.config.display(), error = %format!("{:#}", e), "Failed to load configuration");
            pause_if_interactive();
            std::process::exit(1);
        }
    };

    // 2. Initialize logging
    let _log_guard = logging::init(settings.debug, settings.log_dir.as_deref());

    info!("kabuboot v{} starting...", VERSION);
    info!(
        config = %args.config.display(),
        listen = %settings.server.listen,
        debug = settings.debug,
        kabus_candidates = ?settings.boot.kabus.candidates,
        trade_app_candidates = ?settings.boot.trade_app.target.candidates,
        login_script = %settings.boot.login_script.display(),
        "Configuration loaded"
    );
    if settings.boot.api_password.validate().is_err() {
        warn!("SYSTEM.APIPW is empty; API authentication will fail until it is set");
    }

    // 3. Setup dependencies (DI wiring)
    let token_gateway = KabusApiGateway::new(settings.kabus_api.clone())?;
    let ports = BootPorts {
        probe: default_probe(),
        launcher: Arc::new(DetachedLauncher::new()),
        script_runner: Arc::new(InterpreterScriptRunner::new(settings.script.clone())),
        token_gateway: Arc::new(token_gateway),
        delay: Arc::new(TokioDelay),
    };
    let token_store = Arc::new(TokenStore::new());
    let orchestrator = Arc::new(BootOrchestrator::new(
        ports,
        token_store,
        settings.boot.clone(),
    ));

    // 4. Serve until Ctrl+C
    let server = HttpServer::new(settings.server.clone(), orchestrator);
    server
        .start(shutdown_signal())
        .await
        .map_err(anyhow::Error::msg)?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received. Exiting gracefully..."),
        Err(e) => {
            // Without a signal handler the server runs until killed
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

/// Keep a double-clicked console window open long enough to read the error
fn pause_if_interactive() {
    if std::io::stdin().is_terminal() {
        eprintln!("Press Enter to exit...");
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
    }
}
