use async_trait::async_trait;
use tracing::info;
use trellis_common::WindowId;

use super::SurfaceLauncher;
use crate::error::WindowError;
use crate::window::Window;

/// For surfaces started by something else (a dev server, a test harness).
/// Only logs what would have been opened.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

#[async_trait]
impl SurfaceLauncher for DetachedLauncher {
    async fn launch(&self, window: &Window) -> Result<(), WindowError> {
        info!(window = %window.id, route = %window.route, "waiting for external surface");
        Ok(())
    }

    async fn terminate(&self, _window: WindowId) -> Result<(), WindowError> {
        Ok(())
    }
}
