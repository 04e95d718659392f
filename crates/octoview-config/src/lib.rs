//! Configuration system for octoview.
//!
//! Provides TOML-based configuration with:
//! - `[github]` OAuth client identity and endpoint overrides
//! - `[cache]`, `[http]` and `[storage]` tuning
//! - Config file layering (user config dir + project-local `octoview.toml`)
//! - Client credential resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config_file, load_config_with_options, xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{ResolvedSecret, SecretSource, resolve_client_id, resolve_client_secret};
pub use types::*;
