// Windows process probe via tasklist.exe
// reason: server-side /FI filter avoids transferring the full process table
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use kabuboot_core::error::{AppError, Result};
use kabuboot_core::port::ProcessProbe;

/// Keeps tasklist from flashing a console window
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Process probe backed by `tasklist.exe /FO CSV /NH /FI ...`
pub struct TasklistProbe {
    program: String,
}

impl TasklistProbe {
    pub fn new() -> Self {
        Self {
            program: "tasklist.exe".to_string(),
        }
    }

    /// Run tasklist with one filter and return its stdout
    async fn query(&self, filter: &str) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["/FO", "CSV", "/NH", "/FI", filter])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let output = cmd
            .output()
            .await
            .map_err(|e| AppError::Probe(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(AppError::Probe(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TasklistProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessProbe for TasklistProbe {
    async fn find_pids(&self, image_name: &str) -> Result<Vec<u32>> {
        let stdout = self.query(&format!("IMAGENAME eq {}", image_name)).await?;
        let pids = parse_tasklist_csv(&stdout, |image| image.eq_ignore_ascii_case(image_name))?;

        debug!(image = %image_name, pids = ?pids, "tasklist query completed");
        Ok(pids)
    }

    async fn is_alive(&self, pid: u32) -> bool {
        match self.query(&format!("PID eq {}", pid)).await {
            Ok(stdout) => parse_tasklist_csv(&stdout, |_| true)
                .map(|pids| pids.contains(&pid))
                .unwrap_or(false),
            Err(e) => {
                debug!(pid = pid, error = %e, "Liveness query failed, treating as dead");
                false
            }
        }
    }
}

/// Extract PIDs from `tasklist /FO CSV /NH` output
///
/// Rows look like `"KabuS.exe","1234","Console","1","120,000 K"`. Lines that
/// are not quoted rows (the "INFO: No tasks are running..." notice) are skipped,
/// so an empty match is an empty list rather than an error.
pub(crate) fn parse_tasklist_csv<F>(stdout: &str, mut keep: F) -> Result<Vec<u32>>
where
    F: FnMut(&str) -> bool,
{
    let rows: String = stdout
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('"'))
        .flat_map(|l| [l, "\n"])
        .collect();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(rows.as_bytes());

    let mut pids = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::Probe(format!("unreadable tasklist output: {}", e)))?;
        let (Some(image), Some(pid)) = (record.get(0), record.get(1)) else {
            return Err(AppError::Probe(format!(
                "unexpected tasklist row: {:?}",
                record
            )));
        };
        if !keep(image) {
            continue;
        }
        let pid = pid.parse::<u32>().map_err(|_| {
            AppError::Probe(format!("invalid PID {:?} in tasklist row for {}", pid, image))
        })?;
        pids.push(pid);
    }

    Ok(pids)
}
