//! Validation for the `[proxy]` section and its service tables.

use crate::schema::{ServiceEntry, TrellisConfig};

use super::helpers::{validate_range, TIMEOUT_MAX_MS, TIMEOUT_MIN_MS};

pub(crate) fn validate_proxy(errors: &mut Vec<String>, config: &TrellisConfig) {
    let proxy = &config.proxy;
    validate_range(
        errors,
        "proxy.default_timeout_ms",
        proxy.default_timeout_ms,
        TIMEOUT_MIN_MS,
        TIMEOUT_MAX_MS,
    );
    validate_range(
        errors,
        "proxy.health_timeout_ms",
        proxy.health_timeout_ms,
        TIMEOUT_MIN_MS,
        TIMEOUT_MAX_MS,
    );

    for (id, entry) in &proxy.services {
        errors.extend(validate_service(id, entry));
    }
}

/// Check one service entry. Also used when a service is created from the
/// environment, where there is no surrounding config to report against.
pub fn validate_service(id: &str, entry: &ServiceEntry) -> Vec<String> {
    let mut errors = Vec::new();

    if id.is_empty() || id.chars().any(char::is_whitespace) {
        errors.push(format!("proxy.services: invalid service id {id:?}"));
    }

    if !(entry.target.starts_with("http://") || entry.target.starts_with("https://")) {
        errors.push(format!(
            "proxy.services.{id}.target = {:?} must start with http:// or https://",
            entry.target
        ));
    }

    if let Some(timeout) = entry.timeout_ms {
        validate_range(
            &mut errors,
            &format!("proxy.services.{id}.timeout_ms"),
            timeout,
            TIMEOUT_MIN_MS,
            TIMEOUT_MAX_MS,
        );
    }

    for (i, rule) in entry.rewrite.iter().enumerate() {
        if let Err(e) = regex::Regex::new(&rule.pattern) {
            errors.push(format!("proxy.services.{id}.rewrite[{i}]: {e}"));
        }
    }

    errors
}
