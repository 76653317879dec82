//! Router — validates, authorizes and dispatches named commands.

use idtable_core::config::{IdtableConfig, QueryResponse, RouterConfig};
use idtable_core::{Caller, LEGACY_QUERY_PLACEHOLDER};
use idtable_state::{StateError, StateTable};
use tracing::{debug, info, warn};

use crate::auth::{self, AllowAll, Authorizer};
use crate::command::{Access, Command, Query};
use crate::error::{RouterError, RouterResult};

/// Command front end owning the state table it dispatches to.
///
/// Lifecycle: construct around an opened [`StateTable`], call `init` once
/// per store, issue any number of `invoke`/`query` calls (from any number
/// of threads), then `close`.
pub struct Router {
    table: StateTable,
    config: RouterConfig,
    authorizer: Box<dyn Authorizer>,
}

impl Router {
    /// Router with the given behaviour and no access checks.
    pub fn new(table: StateTable, config: RouterConfig) -> Self {
        Self {
            table,
            config,
            authorizer: Box::new(AllowAll),
        }
    }

    /// Router configured from the `[router]` and `[access]` sections.
    pub fn from_config(table: StateTable, config: &IdtableConfig) -> Self {
        Self {
            table,
            config: config.router.clone(),
            authorizer: auth::from_config(&config.access),
        }
    }

    pub fn with_authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Box::new(authorizer);
        self
    }

    pub fn table(&self) -> &StateTable {
        &self.table
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Provision the `UserIdentity` table. Not idempotent.
    pub fn init(&self) -> RouterResult<()> {
        info!("initializing UserIdentity table");
        match self.table.define_schema() {
            Ok(_) => {
                info!("initialization done");
                Ok(())
            }
            Err(StateError::Schema(msg)) => Err(RouterError::Schema(msg)),
            Err(e) => Err(RouterError::Schema(e.to_string())),
        }
    }

    /// Run a mutating command as an anonymous caller.
    pub fn invoke<S: AsRef<str>>(&self, name: &str, args: &[S]) -> RouterResult<()> {
        self.invoke_as(&Caller::anonymous(), name, args)
    }

    pub fn invoke_as<S: AsRef<str>>(
        &self,
        caller: &Caller,
        name: &str,
        args: &[S],
    ) -> RouterResult<()> {
        debug!(command = name, %caller, "invoke");
        let command = Command::parse(name, args, self.config.create_mode)?;
        self.execute(caller, command)
    }

    /// Dispatch an already parsed command.
    pub fn execute(&self, caller: &Caller, command: Command) -> RouterResult<()> {
        self.authorize(caller, &command.access())?;
        match command {
            Command::Create { user, status } => {
                let status = status.as_deref().unwrap_or(&self.config.create_status);
                self.table.insert(&user, status).map_err(|e| match e {
                    StateError::DuplicateKey(user) => RouterError::AlreadyExists(user),
                    other => RouterError::Store(other),
                })?;
                debug!(%user, "create done");
            }
            Command::Update { user, status } => {
                self.table.replace(&user, &status)?;
                debug!(%user, "update done");
            }
        }
        Ok(())
    }

    /// Run a read-only command as an anonymous caller.
    pub fn query<S: AsRef<str>>(&self, name: &str, args: &[S]) -> RouterResult<Vec<u8>> {
        self.query_as(&Caller::anonymous(), name, args)
    }

    pub fn query_as<S: AsRef<str>>(
        &self,
        caller: &Caller,
        name: &str,
        args: &[S],
    ) -> RouterResult<Vec<u8>> {
        debug!(command = name, %caller, "query");
        let query = Query::parse(name, args)?;
        self.authorize(caller, &query.access())?;
        match query {
            Query::Get { user } => {
                let status = self.table.get(&user).map_err(|e| match e {
                    StateError::NotFound(user) => RouterError::Lookup(user),
                    other => RouterError::Store(other),
                })?;
                match self.config.query_response {
                    QueryResponse::Stored => Ok(status.into_bytes()),
                    QueryResponse::Legacy => {
                        warn!(%user, "returning legacy placeholder instead of stored status");
                        Ok(LEGACY_QUERY_PLACEHOLDER.as_bytes().to_vec())
                    }
                }
            }
        }
    }

    /// Close the underlying state table.
    pub fn close(self) {
        self.table.close();
    }

    fn authorize(&self, caller: &Caller, access: &Access<'_>) -> RouterResult<()> {
        if self.authorizer.authorize(caller, access) {
            return Ok(());
        }
        warn!(%caller, command = access.verb(), user = access.user(), "request denied");
        Err(RouterError::Unauthorized {
            caller: caller.to_string(),
            command: access.verb(),
            user: access.user().to_string(),
        })
    }
}
