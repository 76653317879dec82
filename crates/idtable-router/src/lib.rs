//! idtable-router — named-command front end for the `UserIdentity` table.
//!
//! Three entry points, mirroring what a host process submits:
//!
//! - `init()` provisions the table (exactly once per store).
//! - `invoke(name, args)` runs a mutating command: `create [user]`,
//!   `update [user, status]`.
//! - `query(name, args)` runs the read-only `query [user]` and returns the
//!   stored status as bytes.
//!
//! Every call validates arity, consults the configured [`Authorizer`] and
//! forwards to the [`StateTable`](idtable_state::StateTable). The router
//! keeps no state of its own between calls.

pub mod auth;
pub mod command;
pub mod error;
pub mod router;

pub use auth::{AdminOwnerPolicy, AllowAll, Authorizer};
pub use command::{Access, Command, Query};
pub use error::{ErrorKind, RouterError, RouterResult};
pub use router::Router;
