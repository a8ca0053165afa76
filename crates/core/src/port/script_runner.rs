// Script Runner Port
// Runs the login automation script through a fixed interpreter

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Result of a successful script run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    /// Combined stdout + stderr (None when the deployment discards output)
    pub output: Option<String>,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

/// Script Runner trait
///
/// Blocks until the script exits. No retry happens here.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run `script` with positional `args`
    ///
    /// # Errors
    /// - AppError::Script on spawn failure, non-zero exit or timeout; captured
    ///   output travels inside the error
    async fn run(&self, script: &Path, args: &[String]) -> Result<ScriptOutput>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockScriptBehavior {
        /// Exit 0 with output
        Succeed(String),
        /// Non-zero exit with reason and output
        Fail { reason: String, output: String },
    }

    /// Mock Script Runner for testing
    #[derive(Clone)]
    pub struct MockScriptRunner {
        behavior: Arc<Mutex<MockScriptBehavior>>,
        calls: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
    }

    impl MockScriptRunner {
        pub fn new(behavior: MockScriptBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockScriptBehavior::Succeed("login clicked".to_string()))
        }
        pub fn new_fail(reason: impl Into<String>, output: impl Into<String>) -> Self {
            Self::new(MockScriptBehavior::Fail {
                reason: reason.into(),
                output: output.into(),
            })
        }
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
        pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScriptRunner for MockScriptRunner {
        async fn run(&self, script: &Path, args: &[String]) -> Result<ScriptOutput> {
            self.calls
                .lock()
                .unwrap()
                .push((script.to_path_buf(), args.to_vec()));

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockScriptBehavior::Succeed(output) => Ok(ScriptOutput {
                    output: Some(output),
                    exit_code: Some(0),
                    duration_ms: 10,
                }),
                MockScriptBehavior::Fail { reason, output } => Err(AppError::Script {
                    reason,
                    output: Some(output),
                }),
            }
        }
    }
}
