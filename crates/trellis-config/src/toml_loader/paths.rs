//! Which file to read.

use std::path::{Path, PathBuf};

use trellis_common::ConfigError;

/// Names a config file when `--config` is not given.
pub const CONFIG_PATH_VAR: &str = "TRELLIS_CONFIG";

/// A resolved config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    /// Asked for by the user. Explicit files must exist; the platform
    /// default is created on first run.
    pub explicit: bool,
}

/// `override_path` first, then `env_path`, then
/// `<config_dir>/trellis/config.toml`.
pub fn locate(
    override_path: Option<&Path>,
    env_path: Option<PathBuf>,
) -> Result<ConfigLocation, ConfigError> {
    let explicit = override_path
        .map(Path::to_path_buf)
        .or(env_path.filter(|p| !p.as_os_str().is_empty()));
    if let Some(path) = explicit {
        return Ok(ConfigLocation {
            path,
            explicit: true,
        });
    }

    let dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("no platform config directory".into()))?;
    Ok(ConfigLocation {
        path: dir.join("trellis").join("config.toml"),
        explicit: false,
    })
}
