//! The Service Config Registry.

use std::collections::BTreeMap;

use tracing::{info, warn};
use trellis_config::validation::validate_service;
use trellis_config::ProxyConfig;

use crate::service::{ServiceConfig, ServiceConfigPatch};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Update against a service that is not registered. Nothing changed.
    #[error("no service registered as {service:?}; update ignored")]
    MergeNoop { service: String },

    /// The merged config would be invalid. Nothing changed.
    #[error("invalid config for {service:?}: {reason}")]
    Invalid { service: String, reason: String },
}

/// Per-service configs keyed by service id.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceConfig>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the `[proxy]` config section.
    pub fn from_config(config: &ProxyConfig) -> Self {
        let services = config
            .services
            .iter()
            .map(|(id, entry)| (id.clone(), ServiceConfig::from_entry(id, entry, config)))
            .collect();
        Self { services }
    }

    /// Register or replace a service. Returns the previous config, if any.
    pub fn insert(&mut self, config: ServiceConfig) -> Option<ServiceConfig> {
        self.services.insert(config.service_id.clone(), config)
    }

    pub fn get(&self, service_id: &str) -> Option<&ServiceConfig> {
        self.services.get(service_id)
    }

    pub fn all(&self) -> &BTreeMap<String, ServiceConfig> {
        &self.services
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Shallow-merge `patch` onto an existing service.
    ///
    /// Unknown ids are not created. The merged result is validated before it
    /// replaces the current config.
    pub fn update(
        &mut self,
        service_id: &str,
        patch: &ServiceConfigPatch,
    ) -> Result<&ServiceConfig, RegistryError> {
        let Some(current) = self.services.get_mut(service_id) else {
            warn!(service = %service_id, "config update for unknown service ignored");
            return Err(RegistryError::MergeNoop {
                service: service_id.to_string(),
            });
        };

        let mut merged = current.clone();
        merged.merge(patch);

        let errors = validate_service(service_id, &merged.to_entry());
        if !errors.is_empty() {
            return Err(RegistryError::Invalid {
                service: service_id.to_string(),
                reason: errors.join("; "),
            });
        }

        *current = merged;
        info!(service = %service_id, "service config updated");
        Ok(current)
    }
}
