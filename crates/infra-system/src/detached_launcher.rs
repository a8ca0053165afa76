// Detached process launcher
// reason: tokio::process so dropped children are reaped in the background
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

use kabuboot_core::domain::{LaunchSpec, ProcessHandle};
use kabuboot_core::error::{AppError, Result};
use kabuboot_core::port::ProcessLauncher;

/// Own process group, so a Ctrl+C on the panel's console does not reach the child
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

/// Starts programs without waiting on them
///
/// The child handle is dropped right after spawning: the panel can exit
/// while KabuStation / TradeApp keep running. Arguments are never logged
/// (the TradeApp command line carries the session token).
#[derive(Debug, Default, Clone)]
pub struct DetachedLauncher;

impl DetachedLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessLauncher for DetachedLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> Result<ProcessHandle> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        cmd.process_group(0);

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);

        let child = cmd
            .spawn()
            .map_err(|e| AppError::Launch(format!("{}: {}", spec.program.display(), e)))?;

        let pid = child.id().ok_or_else(|| {
            AppError::Launch(format!(
                "{}: exited before its PID could be read",
                spec.program.display()
            ))
        })?;

        // Ownership released here; liveness is re-probed by PID later
        drop(child);

        let image_name = spec
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| spec.program.display().to_string());

        info!(
            program = %spec.program.display(),
            pid = pid,
            arg_count = spec.args.len(),
            working_dir = ?spec.working_dir,
            "Process launched (detached)"
        );

        Ok(ProcessHandle::new(pid, image_name))
    }

    async fn open_url(&self, url: &str) -> Result<ProcessHandle> {
        self.launch(&url_dispatch_spec(url)).await
    }
}

/// OS URL dispatcher command line for `url`
pub fn url_dispatch_spec(url: &str) -> LaunchSpec {
    if cfg!(windows) {
        LaunchSpec::new("rundll32.exe").args(["url.dll,FileProtocolHandler", url])
    } else if cfg!(target_os = "macos") {
        LaunchSpec::new("open").arg(url)
    } else {
        LaunchSpec::new("xdg-open").arg(url)
    }
}
