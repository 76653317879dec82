//! Error types for the idtable state table.

use thiserror::Error;

/// Result type alias for state table operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during state table operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("table UserIdentity is not defined; run init first")]
    Uninitialized,

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid key: user must be a non-empty string")]
    InvalidKey,
}

impl StateError {
    /// True for faults raised by the storage engine rather than by the
    /// table's own rules.
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            StateError::Open(_)
                | StateError::Transaction(_)
                | StateError::Table(_)
                | StateError::Read(_)
                | StateError::Write(_)
                | StateError::Serialize(_)
                | StateError::Deserialize(_)
        )
    }
}
