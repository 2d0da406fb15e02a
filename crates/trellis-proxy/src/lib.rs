//! Backend request proxy for Trellis.
//!
//! Every outbound call a presentation surface makes goes through here:
//! - `ServiceRegistry` holds per-service target, rewrite rules, timeout,
//!   TLS policy, and headers
//! - `ProxyRouter` resolves a service, rewrites the path, merges headers,
//!   and executes the call with `reqwest`
//! - responses come back as parsed JSON or raw text; failures come back as
//!   a structured `ProxyError` that keeps the service, target, status, and
//!   cause
//! - `health` probes every service concurrently
//!
//! Calls are split into a synchronous `prepare` step, which only reads the
//! registry, and an owned `PreparedCall` future, so the owner of the
//! registry never has to hold it across network I/O.

pub mod error;
pub mod health;
pub mod registry;
pub mod request;
pub mod rewrite;
pub mod router;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ProxyError, ProxyErrorDetails, ProxyErrorKind};
pub use health::{run_health_checks, HealthProbe, HealthReport};
pub use registry::{RegistryError, ServiceRegistry};
pub use request::{ProxyPayload, ProxyRequest};
pub use rewrite::{apply_rewrites, join_url};
pub use router::{PreparedCall, ProxyRouter};
pub use service::{RewriteRule, ServiceConfig, ServiceConfigPatch};
