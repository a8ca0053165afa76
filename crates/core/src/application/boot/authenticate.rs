// KabuStation boot + login automation

use tracing::{info, warn};

use super::resolve::{resolve_file, resolve_target};
use super::{ActionResult, BootOrchestrator};
use crate::domain::{BootFailure, BootReport, TargetKind};

impl BootOrchestrator {
    /// Make sure KabuStation is running, then drive its login window
    ///
    /// Algorithm:
    /// 1. Resolve the executable and the login script
    /// 2. Not running: launch, record PID, wait the settle delay
    ///    Running: enumerate PIDs for the report, no delay
    /// 3. Run the login script with `-ExePath` and `-TimeoutSeconds`
    ///
    /// A script failure does not kill a process started in step 2.
    pub async fn authenticate_kabus(&self) -> ActionResult {
        let target = resolve_target(&self.settings.kabus)
            .map_err(|e| BootFailure::new("KabuStation executable could not be resolved", e))?;
        let script = resolve_file("Login script", &self.settings.login_script)
            .map_err(|e| BootFailure::new("Login script could not be resolved", e))?;

        let running = self
            .probe
            .is_running(&target.image_name)
            .await
            .map_err(|e| BootFailure::new("Failed to check whether KabuStation is running", e))?;

        let (started, pid, pids) = if running {
            let pids = self.probe.find_pids(&target.image_name).await.map_err(|e| {
                BootFailure::new("Failed to list KabuStation processes", e).with_started(false)
            })?;
            let pid = pids.first().copied();
            if let Some(pid) = pid {
                self.pid_book.record(TargetKind::Kabus, pid);
            }
            info!(image = %target.image_name, pids = ?pids, "KabuStation already running, skipping launch");
            (false, pid, Some(pids))
        } else {
            let handle = self
                .launcher
                .launch(&target.launch_spec(Vec::new()))
                .await
                .map_err(|e| BootFailure::new("Failed to launch KabuStation", e).with_started(false))?;
            self.pid_book.record(TargetKind::Kabus, handle.pid);

            info!(
                pid = handle.pid,
                settle_ms = self.settings.timing.kabus_settle.as_millis() as u64,
                "KabuStation launched, waiting for it to settle"
            );
            self.delay.sleep(self.settings.timing.kabus_settle).await;
            (true, Some(handle.pid), None)
        };

        let args = vec![
            "-ExePath".to_string(),
            target.executable.display().to_string(),
            "-TimeoutSeconds".to_string(),
            self.settings.timing.script_timeout.as_secs().to_string(),
        ];

        let output = self.script_runner.run(&script, &args).await.map_err(|e| {
            warn!(error = %e, started = started, "Login automation failed");
            BootFailure::new("KabuStation login automation failed", e)
                .with_started(started)
                .with_pid(pid)
        })?;

        info!(started = started, pid = ?pid, duration_ms = output.duration_ms, "Login automation completed");

        Ok(BootReport {
            message: "KabuStation login automation completed".to_string(),
            pid,
            pids,
            started: Some(started),
            output: output.output,
            url: None,
        })
    }
}
