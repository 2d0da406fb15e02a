//! The Proxy Router: resolve, rewrite, merge headers, execute.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use tracing::{debug, warn};
use trellis_common::new_correlation_id;
use trellis_config::ProxyConfig;

use crate::error::ProxyError;
use crate::registry::ServiceRegistry;
use crate::request::{ProxyPayload, ProxyRequest};
use crate::rewrite::{apply_rewrites, join_url};
use crate::service::RewriteRule;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Executes proxied calls against the services in a `ServiceRegistry`.
///
/// Holds two connection pools, one that verifies TLS certificates and one
/// that does not; each call picks the pool its service asks for.
#[derive(Debug, Clone)]
pub struct ProxyRouter {
    verified: Client,
    unverified: Client,
    base_headers: BTreeMap<String, String>,
    health_timeout: Duration,
}

impl ProxyRouter {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        let verified = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .no_proxy()
            .build()?;
        let unverified = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .no_proxy()
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            verified,
            unverified,
            base_headers: config.default_headers.clone(),
            health_timeout: Duration::from_millis(config.health_timeout_ms),
        })
    }

    pub fn health_timeout(&self) -> Duration {
        self.health_timeout
    }

    pub(crate) fn client_for(&self, verify_tls: bool) -> &Client {
        if verify_tls {
            &self.verified
        } else {
            &self.unverified
        }
    }

    /// Resolve and build a call without touching the network.
    ///
    /// Service rewrite rules run first, then `overrides`, each on the output
    /// of the last. Headers layer router defaults, then the service's
    /// defaults, then the call's own headers; later layers win.
    pub fn prepare(
        &self,
        registry: &ServiceRegistry,
        service_id: &str,
        request: ProxyRequest,
        overrides: Option<&[RewriteRule]>,
    ) -> Result<PreparedCall, ProxyError> {
        let service = registry
            .get(service_id)
            .ok_or_else(|| ProxyError::UnknownService {
                service: service_id.to_string(),
            })?;

        let invalid = |message: String| ProxyError::InvalidRequest {
            service: service_id.to_string(),
            target: service.target_base_url.clone(),
            message,
        };

        let mut path = apply_rewrites(&request.path, &service.path_rewrite_rules)
            .map_err(|e| invalid(format!("service rewrite rule: {e}")))?;
        if let Some(rules) = overrides {
            path = apply_rewrites(&path, rules)
                .map_err(|e| invalid(format!("override rewrite rule: {e}")))?;
        }
        let url = join_url(&service.target_base_url, &path);

        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| invalid(format!("invalid method {:?}", request.method)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in self
            .base_headers
            .iter()
            .chain(service.default_headers.iter())
            .chain(request.headers.iter())
        {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| invalid(format!("invalid header name {name:?}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| invalid(format!("invalid value for header {name:?}")))?;
            headers.insert(header_name, header_value);
        }

        let timeout = Duration::from_millis(request.timeout_ms.unwrap_or(service.timeout_ms));

        Ok(PreparedCall {
            request_id: new_correlation_id(),
            service_id: service_id.to_string(),
            target_base_url: service.target_base_url.clone(),
            url,
            method,
            headers,
            body: request.body,
            query: request.query_params,
            timeout,
            client: self.client_for(service.verify_tls).clone(),
        })
    }

    /// Prepare and send in one step.
    pub async fn proxy_request(
        &self,
        registry: &ServiceRegistry,
        service_id: &str,
        request: ProxyRequest,
        overrides: Option<&[RewriteRule]>,
    ) -> Result<ProxyPayload, ProxyError> {
        self.prepare(registry, service_id, request, overrides)?
            .send()
            .await
    }
}

/// A fully resolved outbound call. Owns everything it needs to run.
#[derive(Debug)]
pub struct PreparedCall {
    request_id: String,
    service_id: String,
    target_base_url: String,
    url: String,
    method: Method,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
    query: BTreeMap<String, String>,
    timeout: Duration,
    client: Client,
}

impl PreparedCall {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn send(self) -> Result<ProxyPayload, ProxyError> {
        debug!(
            request_id = %self.request_id,
            service = %self.service_id,
            method = %self.method,
            url = %self.url,
            "proxy request"
        );

        let mut builder = self
            .client
            .request(self.method.clone(), &self.url)
            .headers(self.headers)
            .timeout(self.timeout);
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        if self.method != Method::GET {
            if let Some(body) = &self.body {
                builder = builder.json(body);
            }
        }

        let service = self.service_id;
        let target = self.target_base_url;
        let transport = |source: reqwest::Error| ProxyError::Transport {
            service: service.clone(),
            target: target.clone(),
            timed_out: source.is_timeout(),
            source,
        };

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));
        let text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            warn!(
                request_id = %self.request_id,
                service = %service,
                status = status.as_u16(),
                "proxy request failed"
            );
            return Err(ProxyError::Status {
                service,
                target,
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(request_id = %self.request_id, status = status.as_u16(), "proxy response");

        if !is_json {
            return Ok(ProxyPayload::Text(text));
        }
        match serde_json::from_str(&text) {
            Ok(value) => Ok(ProxyPayload::Json(value)),
            Err(e) => {
                warn!(
                    request_id = %self.request_id,
                    service = %service,
                    error = %e,
                    "response declared JSON but did not parse; returning text"
                );
                Ok(ProxyPayload::Text(text))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProxyErrorKind;
    use crate::service::ServiceConfig;
    use crate::test_support::{closed_port_url, StubResponse, StubServer};
    use serde_json::json;

    fn router() -> ProxyRouter {
        ProxyRouter::from_config(&ProxyConfig::default()).unwrap()
    }

    fn registry_for(service: &str, target: String) -> ServiceRegistry {
        let mut reg = ServiceRegistry::new();
        reg.insert(ServiceConfig::new(service, target));
        reg
    }

    #[test]
    fn prepare_joins_auth_url() {
        let reg = ServiceRegistry::from_config(&ProxyConfig::default());
        let call = router()
            .prepare(&reg, "auth", ProxyRequest::get("/login"), None)
            .unwrap();
        assert_eq!(call.url(), "http://localhost:8081/auth/login");
        assert_eq!(call.method(), &Method::GET);
        assert_eq!(call.timeout(), Duration::from_millis(30_000));
    }

    #[test]
    fn prepare_applies_service_rules() {
        let mut reg = ServiceRegistry::new();
        let mut api = ServiceConfig::new("api", "http://localhost:8080/api");
        api.path_rewrite_rules
            .push(RewriteRule::new("^/v1", "/internal"));
        reg.insert(api);

        let call = router()
            .prepare(&reg, "api", ProxyRequest::get("/v1/users"), None)
            .unwrap();
        assert_eq!(call.url(), "http://localhost:8080/api/internal/users");
    }

    #[test]
    fn override_rules_run_after_service_rules() {
        let mut reg = ServiceRegistry::new();
        let mut api = ServiceConfig::new("api", "http://h");
        api.path_rewrite_rules.push(RewriteRule::new("^/a", "/b"));
        reg.insert(api);

        let overrides = [RewriteRule::new("^/b", "/c")];
        let call = router()
            .prepare(&reg, "api", ProxyRequest::get("/a/x"), Some(&overrides))
            .unwrap();
        assert_eq!(call.url(), "http://h/c/x");
    }

    #[test]
    fn header_layers_call_wins() {
        let mut reg = ServiceRegistry::new();
        let mut api = ServiceConfig::new("api", "http://h");
        api.default_headers
            .insert("Content-Type".into(), "text/plain".into());
        api.default_headers.insert("X-Client".into(), "svc".into());
        api.default_headers.insert("X-Keep".into(), "svc".into());
        reg.insert(api);

        let request = ProxyRequest::get("/")
            .with_header("x-client", "call")
            .with_header("X-Trace", "abc");
        let call = router().prepare(&reg, "api", request, None).unwrap();
        let h = call.headers();
        assert_eq!(h["content-type"], "text/plain");
        assert_eq!(h["x-client"], "call");
        assert_eq!(h["x-keep"], "svc");
        assert_eq!(h["x-trace"], "abc");
    }

    #[test]
    fn router_default_headers_apply() {
        let reg = registry_for("api", "http://h".into());
        let call = router()
            .prepare(&reg, "api", ProxyRequest::get("/"), None)
            .unwrap();
        assert_eq!(call.headers()["content-type"], "application/json");
    }

    #[test]
    fn per_call_timeout_overrides_service() {
        let reg = registry_for("api", "http://h".into());
        let call = router()
            .prepare(&reg, "api", ProxyRequest::get("/").with_timeout_ms(250), None)
            .unwrap();
        assert_eq!(call.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn lowercase_method_is_accepted() {
        let reg = registry_for("api", "http://h".into());
        let call = router()
            .prepare(&reg, "api", ProxyRequest::new("patch", "/"), None)
            .unwrap();
        assert_eq!(call.method(), &Method::PATCH);
    }

    #[test]
    fn unknown_service_is_rejected() {
        let reg = ServiceRegistry::from_config(&ProxyConfig::default());
        let err = router()
            .prepare(&reg, "billing", ProxyRequest::get("/"), None)
            .unwrap_err();
        assert_eq!(err.kind(), ProxyErrorKind::UnknownService);
        assert_eq!(err.service(), "billing");
    }

    #[test]
    fn bad_override_pattern_is_invalid_request() {
        let reg = registry_for("api", "http://h".into());
        let overrides = [RewriteRule::new("(", "")];
        let err = router()
            .prepare(&reg, "api", ProxyRequest::get("/"), Some(&overrides))
            .unwrap_err();
        assert_eq!(err.kind(), ProxyErrorKind::InvalidRequest);
        assert_eq!(err.details().target_base_url.as_deref(), Some("http://h"));
    }

    #[tokio::test]
    async fn json_response_is_parsed() {
        let server = StubServer::start(StubResponse::json(200, r#"{"token":"t1"}"#)).await;
        let reg = registry_for("auth", format!("{}/auth", server.base_url));

        let payload = router()
            .proxy_request(&reg, "auth", ProxyRequest::get("/login"), None)
            .await
            .unwrap();

        assert_eq!(payload, ProxyPayload::Json(json!({"token": "t1"})));
        let captured = server.last().unwrap();
        assert_eq!(captured.method, "GET");
        assert_eq!(captured.target, "/auth/login");
    }

    #[tokio::test]
    async fn text_response_is_returned_raw() {
        let server = StubServer::start(StubResponse::text(200, "pong")).await;
        let reg = registry_for("api", server.base_url.clone());

        let payload = router()
            .proxy_request(&reg, "api", ProxyRequest::get("/ping"), None)
            .await
            .unwrap();
        assert_eq!(payload, ProxyPayload::Text("pong".into()));
    }

    #[tokio::test]
    async fn malformed_json_falls_back_to_text() {
        let server = StubServer::start(StubResponse::json(200, "{not json")).await;
        let reg = registry_for("api", server.base_url.clone());

        let payload = router()
            .proxy_request(&reg, "api", ProxyRequest::get("/"), None)
            .await
            .unwrap();
        assert_eq!(payload, ProxyPayload::Text("{not json".into()));
    }

    #[tokio::test]
    async fn post_sends_json_body_and_query() {
        let server = StubServer::start(StubResponse::json(201, r#"{"ok":true}"#)).await;
        let reg = registry_for("api", server.base_url.clone());

        let request = ProxyRequest::post("/items", json!({"name": "a"})).with_query("page", "2");
        router()
            .proxy_request(&reg, "api", request, None)
            .await
            .unwrap();

        let captured = server.last().unwrap();
        assert_eq!(captured.method, "POST");
        assert_eq!(captured.target, "/items?page=2");
        let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(body, json!({"name": "a"}));
    }

    #[tokio::test]
    async fn get_drops_body() {
        let server = StubServer::start(StubResponse::text(200, "")).await;
        let reg = registry_for("api", server.base_url.clone());

        let mut request = ProxyRequest::get("/");
        request.body = Some(json!({"ignored": true}));
        router()
            .proxy_request(&reg, "api", request, None)
            .await
            .unwrap();

        assert!(server.last().unwrap().body.is_empty());
    }

    #[tokio::test]
    async fn headers_reach_the_service() {
        let server = StubServer::start(StubResponse::text(200, "")).await;
        let mut reg = ServiceRegistry::new();
        let mut svc = ServiceConfig::new("api", server.base_url.clone());
        svc.default_headers.insert("X-Client".into(), "svc".into());
        reg.insert(svc);

        let request = ProxyRequest::get("/").with_header("X-Client", "call");
        router()
            .proxy_request(&reg, "api", request, None)
            .await
            .unwrap();

        let captured = server.last().unwrap();
        assert_eq!(captured.header("x-client"), Some("call"));
        assert_eq!(captured.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn non_success_status_is_structured() {
        let server = StubServer::start(StubResponse::json(404, r#"{"error":"missing"}"#)).await;
        let target = format!("{}/file", server.base_url);
        let reg = registry_for("file", target.clone());

        let err = router()
            .proxy_request(&reg, "file", ProxyRequest::get("/nope"), None)
            .await
            .unwrap_err();

        let details = err.details();
        assert_eq!(details.kind, ProxyErrorKind::Status);
        assert_eq!(details.service_id, "file");
        assert_eq!(details.http_status, Some(404));
        assert_eq!(details.target_base_url.as_deref(), Some(target.as_str()));
        assert_eq!(details.body.as_deref(), Some(r#"{"error":"missing"}"#));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let target = closed_port_url().await;
        let reg = registry_for("api", target.clone());

        let err = router()
            .proxy_request(&reg, "api", ProxyRequest::get("/"), None)
            .await
            .unwrap_err();

        let details = err.details();
        assert_eq!(details.kind, ProxyErrorKind::Transport);
        assert_eq!(details.service_id, "api");
        assert_eq!(details.target_base_url.as_deref(), Some(target.as_str()));
        assert!(details.http_status.is_none());
        assert!(details.cause.is_some());
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let server = StubServer::start(
            StubResponse::text(200, "late").with_delay(Duration::from_millis(2_000)),
        )
        .await;
        let reg = registry_for("api", server.base_url.clone());

        let err = router()
            .proxy_request(&reg, "api", ProxyRequest::get("/").with_timeout_ms(200), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ProxyErrorKind::Timeout);
        assert!(matches!(err, ProxyError::Transport { timed_out: true, .. }));
    }
}
