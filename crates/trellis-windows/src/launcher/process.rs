use std::collections::HashMap;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use trellis_common::WindowId;
use trellis_config::{IpcConfig, WindowsConfig};

use super::SurfaceLauncher;
use crate::error::WindowError;
use crate::window::Window;

/// Runs one renderer process per window.
///
/// Children are killed on `terminate`. Whatever is still running when the
/// launcher is dropped is killed then.
pub struct ProcessLauncher {
    program: String,
    args: Vec<String>,
    ipc_url: String,
    children: Mutex<HashMap<WindowId, Child>>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>, ipc_url: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            ipc_url: ipc_url.into(),
            children: Mutex::new(HashMap::new()),
        }
    }

    /// `None` when no renderer is configured.
    pub fn from_config(windows: &WindowsConfig, ipc: &IpcConfig) -> Option<Self> {
        let program = windows.renderer.as_ref()?;
        Some(Self::new(
            program.clone(),
            windows.renderer_args.clone(),
            ipc.ws_url(),
        ))
    }

    /// Argument list for `window` with placeholders filled in.
    pub fn args_for(&self, window: &Window) -> Vec<String> {
        let id = window.id.get().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{window}", &id)
                    .replace("{route}", &window.route)
                    .replace("{ipc}", &self.ipc_url)
            })
            .collect()
    }

    pub async fn running(&self) -> Vec<WindowId> {
        let mut ids: Vec<_> = self.children.lock().await.keys().copied().collect();
        ids.sort();
        ids
    }

    /// OS process id of the renderer behind `window`, while it runs.
    pub async fn pid(&self, window: WindowId) -> Option<u32> {
        self.children.lock().await.get(&window).and_then(Child::id)
    }
}

#[async_trait]
impl SurfaceLauncher for ProcessLauncher {
    async fn launch(&self, window: &Window) -> Result<(), WindowError> {
        let args = self.args_for(window);
        debug!(window = %window.id, program = %self.program, ?args, "spawning renderer");

        let child = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| WindowError::Launch {
                window: window.id,
                reason: e.to_string(),
            })?;

        info!(window = %window.id, pid = ?child.id(), "renderer started");
        self.children.lock().await.insert(window.id, child);
        Ok(())
    }

    async fn terminate(&self, window: WindowId) -> Result<(), WindowError> {
        let Some(mut child) = self.children.lock().await.remove(&window) else {
            return Ok(());
        };

        if let Ok(Some(status)) = child.try_wait() {
            debug!(window = %window, %status, "renderer already exited");
            return Ok(());
        }

        child.kill().await.map_err(|e| {
            warn!(window = %window, error = %e, "failed to kill renderer");
            WindowError::Terminate {
                window,
                reason: e.to_string(),
            }
        })?;
        info!(window = %window, "renderer terminated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::WindowRole;

    #[test]
    fn placeholders_are_substituted() {
        let launcher = ProcessLauncher::from_config(
            &WindowsConfig {
                renderer: Some("trellis-view".into()),
                ..Default::default()
            },
            &IpcConfig::default(),
        )
        .unwrap();
        let window = Window::new(WindowId(3), WindowRole::Secondary, Some(WindowId(1)), "/settings");

        assert_eq!(
            launcher.args_for(&window),
            vec![
                "--window",
                "3",
                "--route",
                "/settings",
                "--ipc",
                "ws://127.0.0.1:47800"
            ]
        );
    }

    #[test]
    fn no_renderer_means_no_launcher() {
        assert!(ProcessLauncher::from_config(&WindowsConfig::default(), &IpcConfig::default())
            .is_none());
    }

    #[tokio::test]
    async fn missing_program_is_launch_error() {
        let launcher = ProcessLauncher::new("/nonexistent/trellis-renderer", vec![], "ws://x");
        let window = Window::new(WindowId(1), WindowRole::Primary, None, "/");
        let err = launcher.launch(&window).await.unwrap_err();
        assert!(matches!(err, WindowError::Launch { window, .. } if window == WindowId(1)));
        assert!(launcher.running().await.is_empty());
    }

    #[tokio::test]
    async fn terminate_unknown_is_ok() {
        let launcher = ProcessLauncher::new("true", vec![], "ws://x");
        assert!(launcher.terminate(WindowId(9)).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn launch_then_terminate() {
        let launcher = ProcessLauncher::new("sleep", vec!["30".into()], "ws://x");
        let window = Window::new(WindowId(2), WindowRole::Secondary, Some(WindowId(1)), "/");

        launcher.launch(&window).await.unwrap();
        assert_eq!(launcher.running().await, vec![WindowId(2)]);

        launcher.terminate(WindowId(2)).await.unwrap();
        assert!(launcher.running().await.is_empty());
    }
}
