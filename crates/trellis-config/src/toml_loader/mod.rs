//! Finding, creating, and reading the TOML config file.

mod loader;
mod paths;
mod template;


pub use loader::{load, read_file, ConfigSource, LoadedConfig};
pub use paths::{locate, ConfigLocation, CONFIG_PATH_VAR};
