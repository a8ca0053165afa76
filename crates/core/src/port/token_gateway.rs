// Token Gateway Port
// Credential exchange against KabuStation's local API

use async_trait::async_trait;

use crate::domain::{ApiPassword, SessionToken};
use crate::error::Result;

/// Token Gateway trait
///
/// Each call is independent: no retry, no cached failures. The gateway never
/// writes the token anywhere; storing it is the orchestrator's job.
#[async_trait]
pub trait TokenGateway: Send + Sync {
    /// Exchange the API password for a session token
    ///
    /// # Errors
    /// - AppError::Auth for a blank password (no request is sent), transport
    ///   failure, non-2xx status or an empty token in the response
    async fn authenticate(&self, password: &ApiPassword) -> Result<SessionToken>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock Token Gateway handing out scripted responses
    ///
    /// Responses are consumed in order; the last one repeats.
    #[derive(Clone)]
    pub struct MockTokenGateway {
        responses: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockTokenGateway {
        pub fn new_tokens<I, S>(tokens: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                responses: Arc::new(Mutex::new(
                    tokens.into_iter().map(|t| Ok(t.into())).collect(),
                )),
                call_count: Arc::new(Mutex::new(0)),
            }
        }
        pub fn new_fail(message: impl Into<String>) -> Self {
            let mut responses = VecDeque::new();
            responses.push_back(Err(message.into()));
            Self {
                responses: Arc::new(Mutex::new(responses)),
                call_count: Arc::new(Mutex::new(0)),
            }
        }
        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl TokenGateway for MockTokenGateway {
        async fn authenticate(&self, password: &ApiPassword) -> Result<SessionToken> {
            password
                .validate()
                .map_err(|e| AppError::Auth(e.to_string()))?;
            *self.call_count.lock().unwrap() += 1;

            let mut responses = self.responses.lock().unwrap();
            let next = if responses.len() > 1 {
                responses.pop_front()
            } else {
                responses.front().cloned()
            };

            match next {
                Some(Ok(token)) => {
                    SessionToken::new(token).map_err(|e| AppError::Auth(e.to_string()))
                }
                Some(Err(msg)) => Err(AppError::Auth(msg)),
                None => Err(AppError::Auth("no scripted response".to_string())),
            }
        }
    }
}
