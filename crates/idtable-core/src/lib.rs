pub mod config;
pub mod types;

pub use config::IdtableConfig;
pub use types::*;
