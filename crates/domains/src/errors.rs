//! # DomainError
//!
//! Centralized error handling for the forum store.
//! Every operation reports failure through one of these four variants;
//! nothing panics across the service boundary.

use thiserror::Error;

/// The primary error type for all store and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Entity absent (e.g., unknown thread, unregistered caller)
    #[error("not found: {0}")]
    NotFound(String),

    /// Referenced entity missing or malformed field (e.g., image url scheme)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Duplicate identifier or duplicate registration
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other failure during store access (I/O, decoding, entropy source)
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub fn not_found<T: ToString>(msg: T) -> Self {
        Self::NotFound(msg.to_string())
    }

    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::ValidationError(msg.to_string())
    }

    pub fn conflict<T: ToString>(msg: T) -> Self {
        Self::Conflict(msg.to_string())
    }

    pub fn unexpected<T: ToString>(msg: T) -> Self {
        Self::Unexpected(msg.to_string())
    }

    /// Short, human-readable message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m)
            | Self::ValidationError(m)
            | Self::Conflict(m)
            | Self::Unexpected(m) => m,
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        Self::Unexpected(format!("stored value could not be decoded: {e}"))
    }
}

/// A specialized Result type for forum store logic.
pub type Result<T> = std::result::Result<T, DomainError>;
