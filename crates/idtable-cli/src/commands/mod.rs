pub mod batch;
pub mod ops;

use std::path::Path;

use anyhow::Context;
use idtable_core::IdtableConfig;
use idtable_router::Router;
use idtable_state::StateTable;
use tracing::info;

/// Merge the optional config file with command-line overrides.
pub fn load_config(
    path: Option<&Path>,
    data_dir: Option<&Path>,
    in_memory: bool,
) -> anyhow::Result<IdtableConfig> {
    let mut config = match path {
        Some(path) => IdtableConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => IdtableConfig::default(),
    };
    if let Some(dir) = data_dir {
        config = config.with_data_dir(dir);
    }
    if in_memory {
        config.store.in_memory = true;
    }
    Ok(config)
}

/// Open the configured store and wrap it in a router.
pub fn open_router(config: &IdtableConfig) -> anyhow::Result<Router> {
    let table = if config.store.in_memory {
        StateTable::open_in_memory()?
    } else {
        let path = &config.store.path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }
        let table = StateTable::open(path)?;
        info!(path = ?path, "state table opened");
        table
    };
    Ok(Router::from_config(table, config))
}
