// Process Launcher Port
// Abstraction for starting detached external programs

use crate::domain::{LaunchSpec, ProcessHandle};
use crate::error::Result;
use async_trait::async_trait;

/// Process Launcher trait
///
/// Implementations start the program without waiting on it and release the
/// child handle immediately. No readiness polling happens here.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Start a program and return its PID
    ///
    /// # Errors
    /// - AppError::Launch if the binary cannot be found or spawned
    async fn launch(&self, spec: &LaunchSpec) -> Result<ProcessHandle>;

    /// Open a URL with the OS URL dispatcher (default browser)
    ///
    /// # Errors
    /// - AppError::Launch if the dispatcher cannot be spawned
    async fn open_url(&self, url: &str) -> Result<ProcessHandle>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use crate::port::process_probe::mocks::MockProcessProbe;
    use std::sync::{Arc, Mutex};

    /// What a launched mock process does
    #[derive(Debug, Clone)]
    pub enum MockLaunchBehavior {
        /// Process keeps running
        Survive,
        /// Process exits before anyone can look at it
        ExitImmediately,
        /// Spawn fails with message
        Fail(String),
    }

    /// Mock Process Launcher for testing
    #[derive(Clone)]
    pub struct MockProcessLauncher {
        behavior: Arc<Mutex<MockLaunchBehavior>>,
        launches: Arc<Mutex<Vec<LaunchSpec>>>,
        urls: Arc<Mutex<Vec<String>>>,
        next_pid: Arc<Mutex<u32>>,
        probe: Option<MockProcessProbe>,
    }

    impl MockProcessLauncher {
        pub fn new(behavior: MockLaunchBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                launches: Arc::new(Mutex::new(Vec::new())),
                urls: Arc::new(Mutex::new(Vec::new())),
                next_pid: Arc::new(Mutex::new(4000)),
                probe: None,
            }
        }
        pub fn new_surviving() -> Self {
            Self::new(MockLaunchBehavior::Survive)
        }
        /// Register launched processes with a mock probe
        pub fn with_probe(mut self, probe: MockProcessProbe) -> Self {
            self.probe = Some(probe);
            self
        }
        pub fn set_behavior(&self, behavior: MockLaunchBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }
        pub fn call_count(&self) -> usize {
            self.launches.lock().unwrap().len()
        }
        pub fn launches(&self) -> Vec<LaunchSpec> {
            self.launches.lock().unwrap().clone()
        }
        pub fn opened_urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }

        fn allocate_pid(&self) -> u32 {
            let mut next = self.next_pid.lock().unwrap();
            *next += 1;
            *next
        }
    }

    #[async_trait]
    impl ProcessLauncher for MockProcessLauncher {
        async fn launch(&self, spec: &LaunchSpec) -> Result<ProcessHandle> {
            self.launches.lock().unwrap().push(spec.clone());

            let behavior = self.behavior.lock().unwrap().clone();
            let image_name = spec
                .program
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match behavior {
                MockLaunchBehavior::Fail(msg) => Err(AppError::Launch(msg)),
                MockLaunchBehavior::Survive => {
                    let pid = self.allocate_pid();
                    if let Some(probe) = &self.probe {
                        probe.add_process(&image_name, pid);
                    }
                    Ok(ProcessHandle::new(pid, image_name))
                }
                MockLaunchBehavior::ExitImmediately => {
                    let pid = self.allocate_pid();
                    Ok(ProcessHandle::new(pid, image_name))
                }
            }
        }

        async fn open_url(&self, url: &str) -> Result<ProcessHandle> {
            self.urls.lock().unwrap().push(url.to_string());

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockLaunchBehavior::Fail(msg) => Err(AppError::Launch(msg)),
                _ => Ok(ProcessHandle::new(self.allocate_pid(), "url-dispatch")),
            }
        }
    }
}
