//! Trellis configuration system.
//!
//! TOML-based configuration with environment overrides and full
//! validation. All sections use `serde(default)` so partial configs work
//! out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trellis_config::{config_to_json, load_config};
//!
//! let loaded = load_config(None).expect("failed to load config");
//! println!("from {}", loaded.source);
//! println!("{}", config_to_json(&loaded.config));
//! ```

pub mod env;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use env::{apply_env_overrides, load_dotenv};
pub use schema::{
    IpcConfig, LogLevel, LoggingConfig, ProxyConfig, RewriteEntry, ServiceEntry, TrellisConfig,
    WindowsConfig,
};
pub use toml_loader::{ConfigSource, LoadedConfig};

use std::path::{Path, PathBuf};

use trellis_common::ConfigError;

/// Load the config file (`override_path`, `TRELLIS_CONFIG`, or the
/// platform default), layer the process environment on top, and validate
/// the result.
pub fn load_config(override_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let env_path = std::env::var_os(toml_loader::CONFIG_PATH_VAR).map(PathBuf::from);
    let location = toml_loader::locate(override_path, env_path)?;

    // Non-UTF-8 variables cannot be TRELLIS_* overrides.
    let vars = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
    toml_loader::load(&location, vars)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &TrellisConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
