//! Environment-style configuration input.
//!
//! Read once at startup, after the TOML file. Recognized keys:
//!
//! - `TRELLIS_PROXY_TIMEOUT_MS`: global default proxy timeout
//! - `TRELLIS_PROXY_VERIFY_TLS`: `true/false/1/0/yes/no`
//! - `TRELLIS_SERVICE_<ID>_URL`: target base URL for service `<id>`
//!   (lower-cased, `_` becomes `-`); creates the service when absent
//! - `TRELLIS_IPC_PORT`: IPC listen port
//!
//! `TRELLIS_CONFIG` (which file to read) is handled by the loader.

use std::path::Path;

use trellis_common::ConfigError;

use crate::schema::{ServiceEntry, TrellisConfig};

pub const ENV_PREFIX: &str = "TRELLIS_";

/// Apply every recognized `TRELLIS_*` variable in `vars` to `config`.
///
/// Returns how many variables were applied. Unrecognized `TRELLIS_*` keys
/// are logged and skipped; malformed values are collected into one
/// `ParseError`, and nothing is partially applied for the offending key.
pub fn apply_env_overrides<I, K, V>(config: &mut TrellisConfig, vars: I) -> Result<usize, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut applied = 0;
    let mut errors = Vec::new();

    for (key, value) in vars {
        let key = key.as_ref();
        let value = value.as_ref().trim();
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        match name {
            "PROXY_TIMEOUT_MS" => match value.parse::<u64>() {
                Ok(ms) => {
                    config.proxy.default_timeout_ms = ms;
                    applied += 1;
                }
                Err(e) => errors.push(format!("{key}={value:?}: {e}")),
            },
            "PROXY_VERIFY_TLS" => match parse_bool(value) {
                Some(verify) => {
                    config.proxy.verify_tls = verify;
                    applied += 1;
                }
                None => errors.push(format!("{key}={value:?}: expected a boolean")),
            },
            "IPC_PORT" => match value.parse::<u16>() {
                Ok(port) => {
                    config.ipc.port = port;
                    applied += 1;
                }
                Err(e) => errors.push(format!("{key}={value:?}: {e}")),
            },
            // Read earlier, when choosing the file.
            "CONFIG" => {}
            _ => match service_id_from_key(name) {
                Some(id) => {
                    config
                        .proxy
                        .services
                        .entry(id)
                        .and_modify(|entry| entry.target = value.to_string())
                        .or_insert_with(|| ServiceEntry::with_target(value));
                    applied += 1;
                }
                None => tracing::debug!(key, "ignoring unrecognized environment key"),
            },
        }
    }

    if errors.is_empty() {
        Ok(applied)
    } else {
        Err(ConfigError::ParseError(errors.join("; ")))
    }
}

/// `SERVICE_USER_PROFILE_URL` -> `user-profile`.
fn service_id_from_key(name: &str) -> Option<String> {
    let id = name.strip_prefix("SERVICE_")?.strip_suffix("_URL")?;
    if id.is_empty() {
        return None;
    }
    Some(id.to_ascii_lowercase().replace('_', "-"))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load `KEY=VALUE` lines from a `.env` file into the process environment.
///
/// Variables that are already set win over the file. Returns `false` when
/// the file could not be read.
pub fn load_dotenv(path: &Path) -> bool {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return false;
    };

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
    true
}
