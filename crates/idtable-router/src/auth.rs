//! Authorization capability consulted before dispatch.
//!
//! The state table never checks who is calling; any policy lives here.

use std::collections::HashSet;

use idtable_core::config::{AccessConfig, AccessPolicy};
use idtable_core::Caller;

use crate::command::Access;

/// Decides whether `caller` may perform `access`.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, caller: &Caller, access: &Access<'_>) -> bool;
}

/// Permits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _caller: &Caller, _access: &Access<'_>) -> bool {
        true
    }
}

/// Administrators create users; a user's owner or an administrator
/// updates it; anyone may query.
#[derive(Debug, Clone, Default)]
pub struct AdminOwnerPolicy {
    admins: HashSet<String>,
}

impl AdminOwnerPolicy {
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }

    fn is_admin(&self, caller: &Caller) -> bool {
        caller
            .name
            .as_ref()
            .is_some_and(|name| self.admins.contains(name))
    }
}

impl Authorizer for AdminOwnerPolicy {
    fn authorize(&self, caller: &Caller, access: &Access<'_>) -> bool {
        match access {
            Access::Create { .. } => self.is_admin(caller),
            Access::Update { user } => caller.is(user) || self.is_admin(caller),
            Access::Read { .. } => true,
        }
    }
}

/// Build the authorizer named by the `[access]` config section.
pub fn from_config(config: &AccessConfig) -> Box<dyn Authorizer> {
    match config.policy {
        AccessPolicy::AllowAll => Box::new(AllowAll),
        AccessPolicy::AdminOwner => Box::new(AdminOwnerPolicy::new(config.admins.iter().cloned())),
    }
}
