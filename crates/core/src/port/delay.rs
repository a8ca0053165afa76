// Delay Port (for testability)
// Settle waits go through here so tests can observe them without sleeping.

use async_trait::async_trait;
use std::time::Duration;

/// Sleep provider interface (allows mocking in tests)
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Tokio timer (production)
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records requested delays and returns immediately
    #[derive(Default, Clone)]
    pub struct RecordingDelay {
        calls: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingDelay {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn calls(&self) -> Vec<Duration> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Delay for RecordingDelay {
        async fn sleep(&self, duration: Duration) {
            self.calls.lock().unwrap().push(duration);
            tokio::task::yield_now().await;
        }
    }
}
