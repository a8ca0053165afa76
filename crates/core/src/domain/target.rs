// Boot targets - launchable external applications

use super::process::LaunchSpec;
use std::path::{Path, PathBuf};

/// Where to look for one launchable application
///
/// Built from configuration at request time; `candidates` are tried in order
/// and the first one present on disk wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSpec {
    pub name: String,
    pub candidates: Vec<PathBuf>,
    /// Process image name used by the probe (defaults to the executable's file name)
    pub image_name: Option<String>,
    pub working_dir: Option<PathBuf>,
    pub args: Vec<String>,
}

impl TargetSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn candidate(mut self, path: impl Into<PathBuf>) -> Self {
        self.candidates.push(path.into());
        self
    }

    pub fn image_name(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = Some(image_name.into());
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
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

    /// True if at least one source supplied a path
    pub fn is_configured(&self) -> bool {
        !self.candidates.is_empty()
    }
}

/// A resolved, existing executable ready to be launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootTarget {
    pub name: String,
    pub executable: PathBuf,
    pub image_name: String,
    pub working_dir: Option<PathBuf>,
    pub args: Vec<String>,
}

impl BootTarget {
    pub fn new(spec: &TargetSpec, executable: PathBuf) -> Self {
        let image_name = spec
            .image_name
            .clone()
            .unwrap_or_else(|| image_name_of(&executable));

        Self {
            name: spec.name.clone(),
            executable,
            image_name,
            working_dir: spec.working_dir.clone(),
            args: spec.args.clone(),
        }
    }

    /// Launch spec with the static arguments followed by `extra`
    pub fn launch_spec(&self, extra: Vec<String>) -> LaunchSpec {
        LaunchSpec::new(&self.executable)
            .args(self.args.iter().cloned())
            .args(extra)
            .working_dir(self.working_dir.clone())
    }
}

fn image_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
