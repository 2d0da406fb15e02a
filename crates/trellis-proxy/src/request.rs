use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_method() -> String {
    "GET".into()
}

/// A request descriptor as sent by a presentation surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyRequest {
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Sent as JSON on anything but `GET`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default)]
    pub query_params: BTreeMap<String, String>,
    /// Overrides the service timeout for this call only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ProxyRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
            query_params: BTreeMap::new(),
            timeout_ms: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            body: Some(body),
            ..Self::new("POST", path)
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// Successful proxy result: parsed JSON when the response said so,
/// otherwise the body text untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxyPayload {
    Json(serde_json::Value),
    Text(String),
}

impl ProxyPayload {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ProxyPayload::Json(v) => Some(v),
            ProxyPayload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ProxyPayload::Text(s) => Some(s),
            ProxyPayload::Json(_) => None,
        }
    }
}
