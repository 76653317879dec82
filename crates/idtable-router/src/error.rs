//! Error types for the command router.

use idtable_state::StateError;
use thiserror::Error;

/// Result type alias for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors surfaced to the caller of `init`, `invoke` and `query`.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("incorrect arguments for {command}: expecting {expected}, got {got}")]
    Argument {
        command: String,
        expected: String,
        got: usize,
    },

    #[error("user {0} was already created")]
    AlreadyExists(String),

    #[error("failed retrieving user [{0}]: no such record")]
    Lookup(String),

    #[error("failed creating UserIdentity table: {0}")]
    Schema(String),

    #[error("received unknown function invocation: {0}")]
    UnknownCommand(String),

    #[error("invalid query function name: expecting 'query' but found '{0}'")]
    UnknownQuery(String),

    #[error("caller {caller} is not allowed to {command} user {user}")]
    Unauthorized {
        caller: String,
        command: &'static str,
        user: String,
    },

    #[error(transparent)]
    Store(#[from] StateError),
}

/// Coarse classification of a [`RouterError`], for hosts that branch on
/// the failure kind rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    AlreadyExists,
    Lookup,
    Schema,
    UnknownCommand,
    UnknownQuery,
    Unauthorized,
    Store,
}

impl RouterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouterError::Argument { .. } => ErrorKind::Argument,
            RouterError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            RouterError::Lookup(_) => ErrorKind::Lookup,
            RouterError::Schema(_) => ErrorKind::Schema,
            RouterError::UnknownCommand(_) => ErrorKind::UnknownCommand,
            RouterError::UnknownQuery(_) => ErrorKind::UnknownQuery,
            RouterError::Unauthorized { .. } => ErrorKind::Unauthorized,
            RouterError::Store(_) => ErrorKind::Store,
        }
    }

    pub(crate) fn arity(command: &str, expected: &str, got: usize) -> Self {
        RouterError::Argument {
            command: command.to_string(),
            expected: expected.to_string(),
            got,
        }
    }
}
