// kabuboot Infrastructure - System Adapters
// Implements: ProcessProbe, ProcessLauncher, ScriptRunner

pub mod detached_launcher;
pub mod script_runner_impl;
pub mod sysinfo_probe;
pub mod tasklist_probe;

use std::sync::Arc;

use kabuboot_core::port::ProcessProbe;

pub use detached_launcher::DetachedLauncher;
pub use script_runner_impl::{InterpreterScriptRunner, ScriptRunnerConfig};
pub use sysinfo_probe::SysinfoProbe;
pub use tasklist_probe::TasklistProbe;

/// Process probe for the current OS
///
/// Windows queries `tasklist.exe`; everything else reads the process table in-process.
pub fn default_probe() -> Arc<dyn ProcessProbe> {
    if cfg!(windows) {
        Arc::new(TasklistProbe::new())
    } else {
        Arc::new(SysinfoProbe::new())
    }
}
