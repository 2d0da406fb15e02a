//! Structured proxy failures.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("unknown service: {service}")]
    UnknownService { service: String },

    /// The call could not be built: bad method, header, or rewrite pattern.
    #[error("invalid request for {service}: {message}")]
    InvalidRequest {
        service: String,
        target: String,
        message: String,
    },

    /// No response was received (connect failure, reset, timeout).
    #[error("{service} unreachable at {target}: {source}")]
    Transport {
        service: String,
        target: String,
        timed_out: bool,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("{service} returned HTTP {status}")]
    Status {
        service: String,
        target: String,
        status: u16,
        body: String,
    },
}

/// Category of a proxy failure, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyErrorKind {
    UnknownService,
    InvalidRequest,
    Transport,
    Timeout,
    Status,
}

/// Serializable view of a `ProxyError` that crosses the message channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyErrorDetails {
    pub kind: ProxyErrorKind,
    pub service_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ProxyError {
    pub fn service(&self) -> &str {
        match self {
            ProxyError::UnknownService { service }
            | ProxyError::InvalidRequest { service, .. }
            | ProxyError::Transport { service, .. }
            | ProxyError::Status { service, .. } => service,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProxyError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ProxyErrorKind {
        match self {
            ProxyError::UnknownService { .. } => ProxyErrorKind::UnknownService,
            ProxyError::InvalidRequest { .. } => ProxyErrorKind::InvalidRequest,
            ProxyError::Transport { timed_out: true, .. } => ProxyErrorKind::Timeout,
            ProxyError::Transport { .. } => ProxyErrorKind::Transport,
            ProxyError::Status { .. } => ProxyErrorKind::Status,
        }
    }

    pub fn details(&self) -> ProxyErrorDetails {
        let mut details = ProxyErrorDetails {
            kind: self.kind(),
            service_id: self.service().to_string(),
            target_base_url: None,
            http_status: self.status(),
            message: self.to_string(),
            cause: None,
            body: None,
        };

        match self {
            ProxyError::UnknownService { .. } => {}
            ProxyError::InvalidRequest { target, .. } => {
                details.target_base_url = Some(target.clone());
            }
            ProxyError::Transport { target, source, .. } => {
                details.target_base_url = Some(target.clone());
                details.cause = Some(error_chain(source));
            }
            ProxyError::Status { target, body, .. } => {
                details.target_base_url = Some(target.clone());
                details.body = Some(body.clone());
            }
        }
        details
    }
}

/// Flatten an error and its sources into `outer: inner: root`.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(e) = source {
        parts.push(e.to_string());
        source = e.source();
    }
    parts.join(": ")
}
