//! Domain error model.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Deterministic failures of pure domain rules. Storage and IO failures are
/// typed by the crates that own them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Rejected input or configuration, e.g. a blank reference.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A counter would leave its range.
    #[error("quantity overflow on {0}")]
    QuantityOverflow(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn quantity_overflow(what: impl Into<String>) -> Self {
        Self::QuantityOverflow(what.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
