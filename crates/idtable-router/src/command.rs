//! Parsed router commands.
//!
//! Raw `(name, args)` pairs are turned into typed commands here, so arity
//! rules live in one place and dispatch can match exhaustively.

use idtable_core::config::CreateMode;

use crate::error::{RouterError, RouterResult};

/// A mutating command accepted by `invoke`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Guarded insert. `status` is `None` when the configured default applies.
    Create { user: String, status: Option<String> },
    /// Unconditional replace (upsert).
    Update { user: String, status: String },
}

/// A read-only command accepted by `query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Get { user: String },
}

/// What a command does to which record, as seen by an authorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    Create { user: &'a str },
    Update { user: &'a str },
    Read { user: &'a str },
}

impl Command {
    pub const CREATE: &'static str = "create";
    pub const UPDATE: &'static str = "update";

    pub fn parse<S: AsRef<str>>(name: &str, args: &[S], mode: CreateMode) -> RouterResult<Self> {
        match name {
            Self::CREATE => match (mode, args) {
                (_, [user]) => Ok(Command::Create {
                    user: user_arg(name, user, args.len())?,
                    status: None,
                }),
                (CreateMode::CallerSupplied, [user, status]) => Ok(Command::Create {
                    user: user_arg(name, user, args.len())?,
                    status: Some(status.as_ref().to_string()),
                }),
                (CreateMode::Fixed, _) => Err(RouterError::arity(name, "1 [user]", args.len())),
                (CreateMode::CallerSupplied, _) => Err(RouterError::arity(
                    name,
                    "1 or 2 [user, status]",
                    args.len(),
                )),
            },
            Self::UPDATE => match args {
                [user, status] => Ok(Command::Update {
                    user: user_arg(name, user, args.len())?,
                    status: status.as_ref().to_string(),
                }),
                _ => Err(RouterError::arity(name, "2 [user, status]", args.len())),
            },
            other => Err(RouterError::UnknownCommand(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => Self::CREATE,
            Command::Update { .. } => Self::UPDATE,
        }
    }

    pub fn access(&self) -> Access<'_> {
        match self {
            Command::Create { user, .. } => Access::Create { user },
            Command::Update { user, .. } => Access::Update { user },
        }
    }
}

impl Query {
    pub const QUERY: &'static str = "query";

    pub fn parse<S: AsRef<str>>(name: &str, args: &[S]) -> RouterResult<Self> {
        if name != Self::QUERY {
            return Err(RouterError::UnknownQuery(name.to_string()));
        }
        match args {
            [user] => Ok(Query::Get {
                user: user_arg(name, user, args.len())?,
            }),
            _ => Err(RouterError::arity(name, "1 [user]", args.len())),
        }
    }

    pub fn access(&self) -> Access<'_> {
        match self {
            Query::Get { user } => Access::Read { user },
        }
    }
}

impl Access<'_> {
    pub fn verb(&self) -> &'static str {
        match self {
            Access::Create { .. } => Command::CREATE,
            Access::Update { .. } => Command::UPDATE,
            Access::Read { .. } => Query::QUERY,
        }
    }

    pub fn user(&self) -> &str {
        match self {
            Access::Create { user } | Access::Update { user } | Access::Read { user } => user,
        }
    }
}

fn user_arg<S: AsRef<str>>(command: &str, user: &S, got: usize) -> RouterResult<String> {
    let user = user.as_ref();
    if user.is_empty() {
        return Err(RouterError::arity(command, "a non-empty user name", got));
    }
    Ok(user.to_string())
}
