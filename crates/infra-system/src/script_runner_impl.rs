// Script runner implementation
// reason: tokio process + timeout for a bounded, non-interactive script run
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use kabuboot_core::error::{AppError, Result};
use kabuboot_core::port::{ScriptOutput, ScriptRunner};

/// Interpreter invocation for automation scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRunnerConfig {
    /// Interpreter binary (e.g. `powershell.exe`)
    pub interpreter: String,
    /// Pinned arguments placed before the script path
    pub interpreter_args: Vec<String>,
    /// Keep stdout/stderr for diagnostics; false discards them
    pub capture_output: bool,
    /// Supervisory bound on the whole run; the interpreter is killed on expiry
    pub timeout: Option<Duration>,
}

impl Default for ScriptRunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: "powershell.exe".to_string(),
            interpreter_args: ["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"]
                .into_iter()
                .map(String::from)
                .collect(),
            capture_output: true,
            timeout: None,
        }
    }
}

/// Runs `<interpreter> <interpreter_args...> <script> <args...>` and waits for it
pub struct InterpreterScriptRunner {
    config: ScriptRunnerConfig,
}

impl InterpreterScriptRunner {
    /// Create a new script runner
    ///
    /// # Example
    /// ```ignore
    /// let runner = InterpreterScriptRunner::new(ScriptRunnerConfig::default());
    /// runner.run(Path::new("cmd/Click-KabuStationLogin.ps1"), &args).await?;
    /// ```
    pub fn new(config: ScriptRunnerConfig) -> Self {
        Self { config }
    }

    fn command(&self, script: &Path, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.config.interpreter);
        cmd.args(&self.config.interpreter_args)
            .arg(script)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if self.config.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd
    }
}

#[async_trait]
impl ScriptRunner for InterpreterScriptRunner {
    async fn run(&self, script: &Path, args: &[String]) -> Result<ScriptOutput> {
        let start = Instant::now();

        info!(
            interpreter = %self.config.interpreter,
            script = %script.display(),
            arg_count = args.len(),
            timeout_ms = ?self.config.timeout.map(|t| t.as_millis() as u64),
            "Starting script"
        );

        let child = self.command(script, args).spawn().map_err(|e| AppError::Script {
            reason: format!("failed to start {}: {}", self.config.interpreter, e),
            output: None,
        })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let waited = match self.config.timeout {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    warn!(script = %script.display(), "Script timed out, interpreter killed");
                    AppError::Script {
                        reason: format!("timed out after {}ms", limit.as_millis()),
                        output: None,
                    }
                })?,
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|e| AppError::Script {
            reason: format!("failed to wait for script: {}", e),
            output: None,
        })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let combined = self
            .config
            .capture_output
            .then(|| combine_output(&output.stdout, &output.stderr));

        info!(
            script = %script.display(),
            duration_ms = duration_ms,
            exit_code = ?output.status.code(),
            output_len = combined.as_ref().map(String::len),
            "Script completed"
        );

        if !output.status.success() {
            return Err(AppError::Script {
                reason: format!("script exited with {}", output.status),
                output: combined,
            });
        }

        Ok(ScriptOutput {
            output: combined,
            exit_code: output.status.code(),
            duration_ms,
        })
    }
}

/// stdout then stderr, each trimmed, joined by a newline when both are present
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    match (stdout.trim(), stderr.trim()) {
        ("", err) => err.to_string(),
        (out, "") => out.to_string(),
        (out, err) => format!("{}\n{}", out, err),
    }
}
