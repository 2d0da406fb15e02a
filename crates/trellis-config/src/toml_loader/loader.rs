//! Read the file, layer the environment on top, validate.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use trellis_common::ConfigError;

use super::paths::ConfigLocation;
use super::template::default_config_toml;
use crate::env::apply_env_overrides;
use crate::schema::TrellisConfig;
use crate::validation;

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// First run: the default file was written from the template.
    Created(PathBuf),
    /// The default file could not be written; built-in values only.
    BuiltIn,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Created(path) => write!(f, "{} (created)", path.display()),
            ConfigSource::BuiltIn => f.write_str("built-in defaults"),
        }
    }
}

/// A validated config plus how it was assembled.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TrellisConfig,
    pub source: ConfigSource,
    /// `TRELLIS_*` variables that changed the file's values.
    pub env_applied: usize,
}

/// Parse one file without validating it.
pub fn read_file(path: &Path) -> Result<TrellisConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))
}

/// Build the effective config: file at `location`, then `vars`, then
/// validation. Any failure is returned; nothing falls back silently except
/// an unwritable first-run default file.
pub fn load<I, K, V>(location: &ConfigLocation, vars: I) -> Result<LoadedConfig, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let (mut config, source) = match read_file(&location.path) {
        Ok(config) => (config, ConfigSource::File(location.path.clone())),
        Err(ConfigError::FileNotFound(_)) if !location.explicit => {
            (TrellisConfig::default(), first_run(&location.path))
        }
        Err(e) => return Err(e),
    };

    let env_applied = apply_env_overrides(&mut config, vars)?;
    validation::validate(&config)?;

    Ok(LoadedConfig {
        config,
        source,
        env_applied,
    })
}

fn first_run(path: &Path) -> ConfigSource {
    match write_template(path) {
        Ok(()) => {
            info!(path = %path.display(), "created default config");
            ConfigSource::Created(path.to_path_buf())
        }
        Err(e) => {
            warn!(error = %e, "could not write default config");
            ConfigSource::BuiltIn
        }
    }
}

fn write_template(path: &Path) -> Result<(), ConfigError> {
    let io_error = |source: io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, default_config_toml()).map_err(io_error)
}
