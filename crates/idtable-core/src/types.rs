//! Shared types used across idtable crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status written by `create` unless the caller supplies one.
pub const DEFAULT_CREATE_STATUS: &str = "true";

/// Literal returned by `query` in legacy response mode.
pub const LEGACY_QUERY_PLACEHOLDER: &str = "This is a Test";

/// The identity a host attributes to a request.
///
/// Verifying the identity (certificates, tokens) is the host's job; the
/// router only hands it to the configured authorizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller {
    pub name: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self { name: None }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => f.write_str("<anonymous>"),
        }
    }
}
