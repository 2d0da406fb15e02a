//! How a window's content actually gets on screen.

mod detached;
mod process;

pub use detached::DetachedLauncher;
pub use process::ProcessLauncher;

use async_trait::async_trait;
use trellis_common::WindowId;

use crate::error::WindowError;
use crate::window::Window;

/// Starts and stops the presentation surface behind a window.
///
/// Called from spawned tasks, never while the manager is borrowed.
#[async_trait]
pub trait SurfaceLauncher: Send + Sync {
    async fn launch(&self, window: &Window) -> Result<(), WindowError>;

    /// Must succeed quietly for windows that were never launched or are
    /// already gone.
    async fn terminate(&self, window: WindowId) -> Result<(), WindowError>;
}
