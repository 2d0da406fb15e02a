use serde::{Deserialize, Serialize};

/// Window lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsConfig {
    /// Route loaded by the primary window at startup.
    pub primary_route: String,
    /// Renderer executable launched once per window. When unset, surfaces
    /// are expected to be started by something else and connect on their own.
    pub renderer: Option<String>,
    /// Arguments for `renderer`. `{window}`, `{route}` and `{ipc}` are
    /// substituted per launch.
    pub renderer_args: Vec<String>,
    /// Stop the controller once the primary window has closed.
    pub exit_on_primary_close: bool,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            primary_route: "/".into(),
            renderer: None,
            renderer_args: vec![
                "--window".into(),
                "{window}".into(),
                "--route".into(),
                "{route}".into(),
                "--ipc".into(),
                "{ipc}".into(),
            ],
            exit_on_primary_close: true,
        }
    }
}
