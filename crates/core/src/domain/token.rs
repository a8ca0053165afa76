// Secret values: session token and API password
// Neither ever appears in Debug output or logs.

use super::error::{DomainError, Result};
use std::fmt;

/// Opaque session token issued by KabuStation's local API
///
/// Never empty. The value is stored exactly as issued (no trimming).
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::EmptyToken);
        }
        Ok(Self(value))
    }

    /// Raw token value, for handing to the TradeApp command line only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(***, len={})", self.0.len())
    }
}

/// Password used for the token exchange (`SYSTEM.APIPW`)
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiPassword(String);

impl ApiPassword {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Blank passwords (after trimming) are rejected before any network call
    pub fn validate(&self) -> Result<&str> {
        if self.0.trim().is_empty() {
            return Err(DomainError::EmptyPassword);
        }
        Ok(&self.0)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiPassword(***)")
    }
}
