//! Proxy calls, service config, and health checks.
//!
//! Everything that reads the registry happens here on the dispatcher; the
//! HTTP work runs on spawned tasks that answer through the responder.

use tracing::{info, warn};
use trellis_proxy::{run_health_checks, ProxyRequest, RewriteRule, ServiceConfigPatch};

use crate::protocol::{ConfigUpdateReply, ProxyReply, Reply};

use super::command::Responder;
use super::dispatch::reply;
use super::Controller;

impl Controller {
    pub(super) fn proxy_request(
        &mut self,
        service: &str,
        request: ProxyRequest,
        rewrite: Option<&[RewriteRule]>,
        respond: Option<Responder>,
    ) {
        let call = match self.router.prepare(&self.registry, service, request, rewrite) {
            Ok(call) => call,
            Err(e) => {
                warn!(service, error = %e, "proxy request rejected");
                reply(respond, Reply::Proxy(ProxyReply::from_result(Err(e))));
                return;
            }
        };

        tokio::spawn(async move {
            let result = call.send().await;
            if let Err(e) = &result {
                warn!(service = %e.service(), error = %e, "proxy request failed");
            }
            reply(respond, Reply::Proxy(ProxyReply::from_result(result)));
        });
    }

    pub(super) fn update_proxy_config(
        &mut self,
        service: &str,
        updates: &ServiceConfigPatch,
    ) -> Reply {
        let result = match self.registry.update(service, updates) {
            Ok(config) => ConfigUpdateReply {
                success: true,
                message: format!("updated {service}"),
                config: Some(config.clone()),
            },
            Err(e) => ConfigUpdateReply {
                success: false,
                message: e.to_string(),
                config: None,
            },
        };
        Reply::ConfigUpdate(result)
    }

    pub(super) fn proxy_health_check(&mut self, respond: Option<Responder>) {
        let probes = self.router.health_probes(&self.registry);
        let timeout = self.router.health_timeout();
        info!(services = probes.len(), "health check started");

        tokio::spawn(async move {
            let report = run_health_checks(probes, timeout).await;
            reply(respond, Reply::Health(report));
        });
    }
}
