//! Backend proxy configuration: global defaults plus one table per service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single `pattern -> replacement` path rewrite. `pattern` is a regex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteEntry {
    pub pattern: String,
    pub replacement: String,
}

impl RewriteEntry {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// One backend service as written in the config file.
///
/// `timeout_ms` and `verify_tls` fall back to the `[proxy]` globals when
/// absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEntry {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_tls: Option<bool>,
    pub headers: BTreeMap<String, String>,
    pub rewrite: Vec<RewriteEntry>,
}

impl ServiceEntry {
    pub fn with_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }
}

/// `[proxy]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub default_timeout_ms: u64,
    pub verify_tls: bool,
    /// Timeout for each `/health` probe.
    pub health_timeout_ms: u64,
    /// Lowest-precedence headers, sent on every proxied call.
    pub default_headers: BTreeMap<String, String>,
    pub services: BTreeMap<String, ServiceEntry>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        let mut default_headers = BTreeMap::new();
        default_headers.insert("Content-Type".into(), "application/json".into());

        let mut services = BTreeMap::new();
        services.insert(
            "auth".into(),
            ServiceEntry::with_target("http://localhost:8081/auth"),
        );
        services.insert(
            "file".into(),
            ServiceEntry::with_target("http://localhost:8082/file"),
        );
        services.insert(
            "api".into(),
            ServiceEntry::with_target("http://localhost:8080/api"),
        );

        Self {
            default_timeout_ms: 30_000,
            verify_tls: true,
            health_timeout_ms: 5_000,
            default_headers,
            services,
        }
    }
}
