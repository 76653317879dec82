//! redb table definitions for the idtable state table.
//!
//! Both tables use `&str` keys and `&[u8]` values (JSON-serialized types).

use redb::TableDefinition;

/// Name of the single user relation.
pub const USER_IDENTITY_NAME: &str = "UserIdentity";

/// User records keyed by user name.
pub const USER_IDENTITY: TableDefinition<&str, &[u8]> = TableDefinition::new(USER_IDENTITY_NAME);

/// Schema descriptors keyed by relation name.
pub const SCHEMA_META: TableDefinition<&str, &[u8]> = TableDefinition::new("schema_meta");
