// Process table port
// reason: async-trait needed for object-safe async methods
use async_trait::async_trait;

use crate::error::Result;

/// Process probe port for liveness checks
///
/// Implementations (one per OS family):
/// - TasklistProbe: `tasklist.exe` filtered by image name / PID (Windows)
/// - SysinfoProbe: in-process process table via sysinfo (elsewhere)
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    /// PIDs of every process whose image name matches (case-insensitive)
    ///
    /// # Errors
    /// - AppError::Probe if the listing tool failed to run or its output was unparseable
    ///
    /// A successful query that matched nothing returns an empty list.
    async fn find_pids(&self, image_name: &str) -> Result<Vec<u32>>;

    /// Check whether any process with the image name is running
    async fn is_running(&self, image_name: &str) -> Result<bool> {
        Ok(!self.find_pids(image_name).await?.is_empty())
    }

    /// Check if a process is still alive
    ///
    /// Any query failure counts as "not alive".
    async fn is_alive(&self, pid: u32) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// Mock ProcessProbe backed by an in-memory process table
    #[derive(Default, Clone)]
    pub struct MockProcessProbe {
        images: Arc<Mutex<HashMap<String, Vec<u32>>>>,
        alive: Arc<Mutex<HashSet<u32>>>,
        failing: Arc<Mutex<Option<String>>>,
    }

    impl MockProcessProbe {
        pub fn new() -> Self {
            Self::default()
        }
        /// Register a running process
        pub fn add_process(&self, image_name: &str, pid: u32) {
            self.images
                .lock()
                .unwrap()
                .entry(image_name.to_lowercase())
                .or_default()
                .push(pid);
            self.alive.lock().unwrap().insert(pid);
        }
        /// Mark a PID alive without an image entry (e.g. a freshly launched child)
        pub fn set_alive(&self, pid: u32, alive: bool) {
            let mut set = self.alive.lock().unwrap();
            if alive {
                set.insert(pid);
            } else {
                set.remove(&pid);
            }
        }
        /// Make every table query fail with the given message
        pub fn fail_with(&self, message: impl Into<String>) {
            *self.failing.lock().unwrap() = Some(message.into());
        }
    }

    #[async_trait]
    impl ProcessProbe for MockProcessProbe {
        async fn find_pids(&self, image_name: &str) -> Result<Vec<u32>> {
            if let Some(msg) = self.failing.lock().unwrap().clone() {
                return Err(AppError::Probe(msg));
            }
            Ok(self
                .images
                .lock()
                .unwrap()
                .get(&image_name.to_lowercase())
                .cloned()
                .unwrap_or_default())
        }
        async fn is_alive(&self, pid: u32) -> bool {
            if self.failing.lock().unwrap().is_some() {
                return false;
            }
            self.alive.lock().unwrap().contains(&pid)
        }
    }
}
