//! Wire protocol between the controller and presentation surfaces.
//!
//! Every frame is a JSON text message tagged by `type`. A surface opens with
//! `hello`, then sends `ClientFrame`s; requests carry an `id` that the
//! matching `reply` echoes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use trellis_common::{CanonicalState, LanguageState, StatePatch, WindowId};
use trellis_proxy::{
    HealthReport, ProxyError, ProxyErrorDetails, ProxyPayload, ProxyRequest, RewriteRule,
    ServiceConfig, ServiceConfigPatch,
};
use trellis_windows::WindowOp;

/// Service behind the `auth-request` alias.
pub const AUTH_SERVICE: &str = "auth";
/// Service behind the `file-request` alias.
pub const FILE_SERVICE: &str = "file";

fn default_route() -> String {
    "/".into()
}

/// First frame on every connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Hello {
    Hello { window: WindowId },
}

/// A surface message plus the optional request id its reply should carry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientFrame {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub message: ClientMessage,
}

/// Messages a surface may send after `hello`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    OpenSecondary {
        #[serde(default = "default_route")]
        route: String,
    },
    CloseMostRecentSecondary,
    MinimizeWindow,
    MaximizeWindow,
    RestoreWindow,
    CloseWindow,
    IsMaximized,

    /// Fire-and-forget partial update.
    StateUpdate { patch: StatePatch },
    /// The surface finished loading; answered with a full snapshot push.
    LoadComplete,
    GetInitialState,
    GetInitialLanguageState,

    ProxyRequest {
        service: String,
        request: ProxyRequest,
        /// Extra rewrite rules applied after the service's own.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rewrite: Option<Vec<RewriteRule>>,
    },
    AuthRequest { request: ProxyRequest },
    FileRequest { request: ProxyRequest },
    GetProxyConfig { service: String },
    GetAllProxyConfigs,
    UpdateProxyConfig {
        service: String,
        updates: ServiceConfigPatch,
    },
    ProxyHealthCheck,
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::OpenSecondary { .. } => "open-secondary",
            ClientMessage::CloseMostRecentSecondary => "close-most-recent-secondary",
            ClientMessage::MinimizeWindow => "minimize-window",
            ClientMessage::MaximizeWindow => "maximize-window",
            ClientMessage::RestoreWindow => "restore-window",
            ClientMessage::CloseWindow => "close-window",
            ClientMessage::IsMaximized => "is-maximized",
            ClientMessage::StateUpdate { .. } => "state-update",
            ClientMessage::LoadComplete => "load-complete",
            ClientMessage::GetInitialState => "get-initial-state",
            ClientMessage::GetInitialLanguageState => "get-initial-language-state",
            ClientMessage::ProxyRequest { .. } => "proxy-request",
            ClientMessage::AuthRequest { .. } => "auth-request",
            ClientMessage::FileRequest { .. } => "file-request",
            ClientMessage::GetProxyConfig { .. } => "get-proxy-config",
            ClientMessage::GetAllProxyConfigs => "get-all-proxy-configs",
            ClientMessage::UpdateProxyConfig { .. } => "update-proxy-config",
            ClientMessage::ProxyHealthCheck => "proxy-health-check",
        }
    }
}

/// Messages the controller sends to a surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    Reply { id: u64, result: Reply },
    /// Merge these keys into the local cache.
    StatePatch { patch: StatePatch },
    /// Replace the local cache entirely.
    StateSnapshot { state: CanonicalState },
    /// Perform a window operation locally.
    WindowCommand { op: WindowOp },
    /// The window was closed; the surface should go away.
    Close,
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        message: String,
    },
}

impl ServerMessage {
    pub fn error(id: Option<u64>, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            id,
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"type":"error","message":"serialize: {e}"}}"#))
    }
}

/// Payload of a `reply` frame. Shape depends on the request kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Control(ControlReply),
    State(CanonicalState),
    Language(LanguageState),
    Proxy(ProxyReply),
    /// `null` when the service is not registered.
    Config(Option<ServiceConfig>),
    Configs(BTreeMap<String, ServiceConfig>),
    ConfigUpdate(ConfigUpdateReply),
    Health(HealthReport),
}

/// The uniform `{success, message}` envelope for window operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlReply {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximized: Option<bool>,
}

impl ControlReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            maximized: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            maximized: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ProxyPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ProxyErrorDetails>,
}

impl ProxyReply {
    pub fn from_result(result: Result<ProxyPayload, ProxyError>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
                details: None,
            },
            Err(e) => Self {
                success: false,
                data: None,
                error: Some(e.to_string()),
                details: Some(e.details()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigUpdateReply {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ServiceConfig>,
}
