//! Domain types for the idtable state table.

use serde::{Deserialize, Serialize};

use crate::tables::USER_IDENTITY_NAME;

/// One `(user, status)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub user: String,
    /// Opaque status text. `create` conventionally writes `"true"`.
    pub status: String,
}

impl UserRecord {
    pub fn new(user: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            status: status.into(),
        }
    }
}

/// Column value types. Only strings are supported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub key: bool,
}

/// Persisted description of a relation, written once by `define_schema`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub relation: String,
    pub columns: Vec<ColumnDefinition>,
}

impl SchemaDescriptor {
    /// `UserIdentity(User: string key, Status: string)`.
    pub fn user_identity() -> Self {
        Self {
            relation: USER_IDENTITY_NAME.to_string(),
            columns: vec![
                ColumnDefinition {
                    name: "User".to_string(),
                    column_type: ColumnType::String,
                    key: true,
                },
                ColumnDefinition {
                    name: "Status".to_string(),
                    column_type: ColumnType::String,
                    key: false,
                },
            ],
        }
    }

    pub fn key_column(&self) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.key)
    }
}
