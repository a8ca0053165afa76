// Process values: what to start, and what was started

use serde::Serialize;
use std::path::PathBuf;

/// Everything needed to spawn one external program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl LaunchSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }
}

/// A detached process snapshot
///
/// Ownership of the child is released at launch; later liveness checks are
/// fresh probes by PID, not tracked handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessHandle {
    pub pid: u32,
    pub image_name: String,
}

impl ProcessHandle {
    pub fn new(pid: u32, image_name: impl Into<String>) -> Self {
        Self {
            pid,
            image_name: image_name.into(),
        }
    }
}
