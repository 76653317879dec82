//! idtable.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::DEFAULT_CREATE_STATUS;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdtableConfig {
    pub store: StoreConfig,
    pub router: RouterConfig,
    pub access: AccessConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. Ignored when `in_memory` is set.
    pub path: PathBuf,
    pub in_memory: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("idtable.redb"),
            in_memory: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub create_mode: CreateMode,
    /// Status stored by `create` when the caller does not supply one.
    pub create_status: String,
    pub query_response: QueryResponse,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            create_mode: CreateMode::default(),
            create_status: DEFAULT_CREATE_STATUS.to_string(),
            query_response: QueryResponse::default(),
        }
    }
}

/// How `create` obtains the initial status of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateMode {
    /// `create [user]`; the status is always `create_status`.
    #[default]
    Fixed,
    /// `create [user]` or `create [user, status]`.
    CallerSupplied,
}

/// What `query` hands back on a successful lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryResponse {
    /// The stored status.
    #[default]
    Stored,
    /// A fixed placeholder, independent of the stored status.
    Legacy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub policy: AccessPolicy,
    pub admins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// No checks at all.
    #[default]
    AllowAll,
    /// Admins create; owners or admins update; anyone queries.
    AdminOwner,
}

impl IdtableConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: IdtableConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Store the database file under `dir`, keeping the configured file name.
    pub fn with_data_dir(mut self, dir: &Path) -> Self {
        let file_name = self
            .store
            .path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("idtable.redb"));
        self.store.path = dir.join(file_name);
        self
    }
}
