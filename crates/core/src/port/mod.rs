// Port Layer - Interfaces for external dependencies

pub mod delay; // For deterministic testing
pub mod process_launcher;
pub mod process_probe;
pub mod script_runner;
pub mod token_gateway;

// Re-exports
pub use delay::{Delay, TokioDelay};
pub use process_launcher::ProcessLauncher;
pub use process_probe::ProcessProbe;
pub use script_runner::{ScriptOutput, ScriptRunner};
pub use token_gateway::TokenGateway;
