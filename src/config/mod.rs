//! Configuration module for gdpipe
//!
//! Provides types and parsing for `gdpipe.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{
    find_config, find_config_from, load_config, load_config_file, merge_cli_overrides,
    resolve_path, CliOverrides, ConfigError, LoadedConfig, CONFIG_FILE_NAME,
};
pub use schema::*;
