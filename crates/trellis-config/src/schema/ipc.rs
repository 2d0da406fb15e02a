use serde::{Deserialize, Serialize};

/// Where the controller listens for presentation surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    pub host: String,
    pub port: u16,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 47800,
        }
    }
}

impl IpcConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL handed to renderer processes so they can connect back.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}
