// Path resolution for executables, scripts and config files
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::{BootTarget, TargetSpec};
use crate::error::{AppError, Result};

/// Resolve a target to the first candidate present on disk
///
/// # Errors
/// - AppError::Resolution if no candidate is configured or none exists
pub fn resolve_target(spec: &TargetSpec) -> Result<BootTarget> {
    if !spec.is_configured() {
        return Err(AppError::Resolution(format!(
            "{} executable is not configured",
            spec.name
        )));
    }

    for candidate in &spec.candidates {
        if candidate.as_os_str().is_empty() {
            continue;
        }
        if candidate.exists() {
            debug!(target_name = %spec.name, path = %candidate.display(), "Executable resolved");
            return Ok(BootTarget::new(spec, candidate.clone()));
        }
        debug!(target_name = %spec.name, path = %candidate.display(), "Candidate missing");
    }

    Err(AppError::Resolution(format!(
        "{} executable not found (tried: {})",
        spec.name,
        spec.candidates
            .iter()
            .map(|c| c.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

/// Check that a configured auxiliary file exists
pub fn resolve_file(label: &str, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(AppError::Resolution(format!(
            "{} not found: {}",
            label,
            path.display()
        )))
    }
}
