//! Concurrent `/health` probing of every registered service.

use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::future::join_all;
use reqwest::Client;
use tracing::debug;

use crate::registry::ServiceRegistry;
use crate::rewrite::join_url;
use crate::router::ProxyRouter;

/// Service id to healthy flag. Every probed service has an entry.
pub type HealthReport = BTreeMap<String, bool>;

/// One owned health check, detached from the registry it was built from.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    pub service_id: String,
    pub url: String,
    client: Client,
}

impl HealthProbe {
    async fn run(self, timeout: Duration) -> (String, bool) {
        let healthy = match self.client.get(&self.url).timeout(timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(service = %self.service_id, error = %e, "health probe failed");
                false
            }
        };
        (self.service_id, healthy)
    }
}

impl ProxyRouter {
    /// One probe per registered service, aimed at `<target>/health`.
    pub fn health_probes(&self, registry: &ServiceRegistry) -> Vec<HealthProbe> {
        registry
            .all()
            .values()
            .map(|svc| HealthProbe {
                service_id: svc.service_id.clone(),
                url: join_url(&svc.target_base_url, "/health"),
                client: self.client_for(svc.verify_tls).clone(),
            })
            .collect()
    }

    pub async fn health_check(&self, registry: &ServiceRegistry) -> HealthReport {
        run_health_checks(self.health_probes(registry), self.health_timeout()).await
    }
}

/// Run all probes at once. Never fails: unreachable or non-2xx is `false`.
pub async fn run_health_checks(probes: Vec<HealthProbe>, timeout: Duration) -> HealthReport {
    join_all(probes.into_iter().map(|p| p.run(timeout)))
        .await
        .into_iter()
        .collect()
}
