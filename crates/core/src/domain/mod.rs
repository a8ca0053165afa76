// Domain Layer - Pure values exchanged between orchestrator and adapters

pub mod error;
pub mod process;
pub mod report;
pub mod target;
pub mod token;

// Re-exports
pub use error::DomainError;
pub use process::{LaunchSpec, ProcessHandle};
pub use report::{BootFailure, BootReport, PidEntry, PidReport, TargetKind};
pub use target::{BootTarget, TargetSpec};
pub use token::{ApiPassword, SessionToken};
