//! Full configuration validation.
//!
//! Each section has its own check; this orchestrator calls them all and
//! collects errors into a single `ConfigError`.

mod helpers;
mod proxy;


pub use proxy::validate_service;

use crate::schema::TrellisConfig;
use trellis_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &TrellisConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.ipc.port == 0 {
        errors.push("ipc.port must be non-zero".into());
    }
    if config.ipc.host.trim().is_empty() {
        errors.push("ipc.host must not be empty".into());
    }

    proxy::validate_proxy(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
