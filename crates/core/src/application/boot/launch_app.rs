// TradeApp launch with token handoff

use tracing::{info, warn};

use super::resolve::{resolve_file, resolve_target};
use super::{ActionResult, BootOrchestrator};
use crate::domain::{BootFailure, BootReport, TargetKind};
use crate::error::AppError;

impl BootOrchestrator {
    /// Start TradeApp with the stored session token
    ///
    /// Algorithm:
    /// 1. Refuse without a stored token (nothing is launched)
    /// 2. No executable configured but a fallback URL: open it in the browser
    /// 3. Resolve the executable and, if configured, its config file
    /// 4. Launch with `<conf_flag> <conf> <token_flag> <token>`, record PID
    /// 5. Wait the settle delay, then re-probe the PID; dead means it crashed on start
    pub async fn launch_trade_app(&self) -> ActionResult {
        let Some(token) = self.token_store.get() else {
            return Err(BootFailure::new(
                "Not authenticated: run the API authentication first",
                AppError::NotAuthenticated("no session token stored".to_string()),
            ));
        };

        let trade = &self.settings.trade_app;
        if !trade.target.is_configured() {
            if let Some(url) = &trade.fallback_url {
                return self.open_trade_web(url).await;
            }
        }

        let target = resolve_target(&trade.target)
            .map_err(|e| BootFailure::new("TradeApp executable could not be resolved", e))?;

        let mut extra = Vec::with_capacity(4);
        if let Some(config_file) = &trade.config_file {
            let config_file = resolve_file("TradeApp config file", config_file)
                .map_err(|e| BootFailure::new("TradeApp config file could not be resolved", e))?;
            extra.push(trade.conf_flag.clone());
            extra.push(config_file.display().to_string());
        }
        extra.push(trade.token_flag.clone());
        extra.push(token.expose().to_string());

        let handle = self
            .launcher
            .launch(&target.launch_spec(extra))
            .await
            .map_err(|e| BootFailure::new("Failed to launch TradeApp", e))?;
        self.pid_book.record(TargetKind::TradeApp, handle.pid);

        self.delay.sleep(self.settings.timing.trade_app_settle).await;

        if !self.probe.is_alive(handle.pid).await {
            warn!(pid = handle.pid, "TradeApp exited right after launch");
            return Err(BootFailure::new(
                "TradeApp exited right after launch (check its arguments and token)",
                AppError::CrashedImmediately { pid: handle.pid },
            )
            .with_pid(Some(handle.pid)));
        }

        info!(pid = handle.pid, image = %handle.image_name, "TradeApp launched");

        Ok(BootReport {
            message: "TradeApp launched".to_string(),
            pid: Some(handle.pid),
            ..Default::default()
        })
    }

    async fn open_trade_web(&self, url: &str) -> ActionResult {
        if url.trim().is_empty() {
            return Err(BootFailure::new(
                "TradeWebApp URL is empty",
                AppError::Resolution("no TradeApp executable or URL configured".to_string()),
            ));
        }

        let handle = self
            .launcher
            .open_url(url)
            .await
            .map_err(|e| BootFailure::new("Failed to open TradeWebApp URL", e).with_url(url))?;

        info!(url = %url, "TradeWebApp URL opened");

        Ok(BootReport {
            message: "TradeWebApp opened in the browser".to_string(),
            pid: Some(handle.pid),
            url: Some(url.to_string()),
            ..Default::default()
        })
    }
}
