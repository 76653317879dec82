//! idtable-state — the `UserIdentity` state table.
//!
//! Backed by [redb](https://docs.rs/redb). One relation maps a user name
//! to an opaque status string; a metadata table records the schema once
//! `define_schema` has run.
//!
//! # Concurrency
//!
//! Every mutation runs inside a single redb write transaction. redb admits
//! one write transaction at a time, so the existence check in `insert` and
//! the delete-then-insert in `replace` are atomic with respect to each other.
//! Reads use MVCC read transactions and never observe a partial replace.
//!
//! The `StateTable` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`).

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateTable;
pub use types::*;
