// Session token store
// The only mutable state shared between concurrent actions.
use parking_lot::RwLock;

use crate::domain::SessionToken;

/// Holds the single current session token in memory
///
/// Readers run concurrently, writers are exclusive. A token is swapped in
/// whole, so readers never observe a partially written value. Nothing is
/// persisted; the store is empty again after a restart.
#[derive(Default)]
pub struct TokenStore {
    token: RwLock<Option<SessionToken>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored token
    pub fn set(&self, token: SessionToken) {
        *self.token.write() = Some(token);
    }

    /// Current token; `None` means "not authenticated"
    pub fn get(&self) -> Option<SessionToken> {
        self.token.read().clone()
    }
}
