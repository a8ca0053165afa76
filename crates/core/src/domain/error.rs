// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Session token is empty")]
    EmptyToken,

    #[error("API password is empty")]
    EmptyPassword,
}

pub type Result<T> = std::result::Result<T, DomainError>;
