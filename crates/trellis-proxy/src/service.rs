//! Runtime per-service configuration and its partial-update form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use trellis_config::{ProxyConfig, ServiceEntry};

pub use trellis_config::RewriteEntry as RewriteRule;

/// Resolved configuration for one backend service.
///
/// Unlike the file form (`ServiceEntry`), timeout and TLS policy are always
/// concrete here: the `[proxy]` globals were folded in when the registry
/// was seeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub service_id: String,
    pub target_base_url: String,
    /// Applied in order, each to the output of the previous one.
    pub path_rewrite_rules: Vec<RewriteRule>,
    pub timeout_ms: u64,
    pub verify_tls: bool,
    /// Service-level headers. They override the router-wide defaults and
    /// are overridden by per-call headers.
    pub default_headers: BTreeMap<String, String>,
}

impl ServiceConfig {
    pub fn new(service_id: impl Into<String>, target_base_url: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            target_base_url: target_base_url.into(),
            path_rewrite_rules: Vec::new(),
            timeout_ms: ProxyConfig::default().default_timeout_ms,
            verify_tls: true,
            default_headers: BTreeMap::new(),
        }
    }

    pub fn from_entry(service_id: &str, entry: &ServiceEntry, globals: &ProxyConfig) -> Self {
        Self {
            service_id: service_id.to_string(),
            target_base_url: entry.target.clone(),
            path_rewrite_rules: entry.rewrite.clone(),
            timeout_ms: entry.timeout_ms.unwrap_or(globals.default_timeout_ms),
            verify_tls: entry.verify_tls.unwrap_or(globals.verify_tls),
            default_headers: entry.headers.clone(),
        }
    }

    /// Back to the file form, for validation.
    pub fn to_entry(&self) -> ServiceEntry {
        ServiceEntry {
            target: self.target_base_url.clone(),
            timeout_ms: Some(self.timeout_ms),
            verify_tls: Some(self.verify_tls),
            headers: self.default_headers.clone(),
            rewrite: self.path_rewrite_rules.clone(),
        }
    }

    /// Shallow merge: every field present in `patch` replaces the current
    /// value wholesale; absent fields are untouched.
    pub fn merge(&mut self, patch: &ServiceConfigPatch) {
        if let Some(target) = &patch.target_base_url {
            self.target_base_url.clone_from(target);
        }
        if let Some(rules) = &patch.path_rewrite_rules {
            self.path_rewrite_rules.clone_from(rules);
        }
        if let Some(timeout) = patch.timeout_ms {
            self.timeout_ms = timeout;
        }
        if let Some(verify) = patch.verify_tls {
            self.verify_tls = verify;
        }
        if let Some(headers) = &patch.default_headers {
            self.default_headers.clone_from(headers);
        }
    }
}

/// Partial update for `ServiceConfig`. The service id cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_rewrite_rules: Option<Vec<RewriteRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_tls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_headers: Option<BTreeMap<String, String>>,
}
