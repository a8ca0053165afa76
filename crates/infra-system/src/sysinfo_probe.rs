// Process probe implementation via sysinfo
// reason: sysinfo for cross-platform process table access
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use sysinfo::{Pid, ProcessStatus, System};
use tracing::debug;

use kabuboot_core::error::{AppError, Result};
use kabuboot_core::port::ProcessProbe;

/// Process probe reading the OS process table in-process
///
/// Zombie and dead entries count as not running: a detached child that
/// already exited but was not reaped yet must not look alive.
pub struct SysinfoProbe {
    system: Arc<Mutex<System>>,
}

impl SysinfoProbe {
    /// Create a new probe
    ///
    /// # Example
    /// ```ignore
    /// let probe = SysinfoProbe::new();
    /// let pids = probe.find_pids("KabuS.exe").await?;
    /// ```
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessProbe for SysinfoProbe {
    async fn find_pids(&self, image_name: &str) -> Result<Vec<u32>> {
        let system = self.system.clone();
        let image = image_name.to_string();

        // Refreshing the process table is blocking work
        let pids = tokio::task::spawn_blocking(move || {
            let mut sys = system.lock();
            sys.refresh_processes();

            let mut pids: Vec<u32> = sys
                .processes()
                .values()
                .filter(|p| is_live_status(p.status()) && matches_image(p.name(), &image))
                .map(|p| p.pid().as_u32())
                .collect();
            pids.sort_unstable();
            pids
        })
        .await
        .map_err(|e| AppError::Probe(format!("process table query failed: {}", e)))?;

        debug!(image = %image_name, pids = ?pids, "Process table query completed");
        Ok(pids)
    }

    async fn is_alive(&self, pid: u32) -> bool {
        let system = self.system.clone();

        let alive = tokio::task::spawn_blocking(move || {
            let mut sys = system.lock();
            let pid = Pid::from_u32(pid);
            if !sys.refresh_process(pid) {
                return false;
            }
            sys.process(pid)
                .map(|p| is_live_status(p.status()))
                .unwrap_or(false)
        })
        .await
        .unwrap_or(false);

        debug!(pid = pid, alive = alive, "Liveness check completed");
        alive
    }
}

fn is_live_status(status: ProcessStatus) -> bool {
    !matches!(status, ProcessStatus::Zombie | ProcessStatus::Dead)
}

/// Case-insensitive image match; `KabuS.exe` also matches a bare `KabuS`
fn matches_image(name: &str, image: &str) -> bool {
    name.eq_ignore_ascii_case(image) || strip_exe(name).eq_ignore_ascii_case(strip_exe(image))
}

fn strip_exe(name: &str) -> &str {
    let len = name.len();
    if len > 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".exe") {
        &name[..len - 4]
    } else {
        name
    }
}
