//! Per-window control operations.

use tracing::debug;
use trellis_common::WindowId;

use crate::error::WindowError;
use crate::window::WindowOp;

use super::types::{ControlEffect, WindowManager};

impl WindowManager {
    /// Apply `op` to the window behind the calling surface.
    ///
    /// `origin` is whatever window the transport bound the caller to; an
    /// unbound or untracked caller gets `NotFound`.
    pub fn control(
        &mut self,
        origin: Option<WindowId>,
        op: WindowOp,
    ) -> Result<ControlEffect, WindowError> {
        let id = origin
            .filter(|id| self.windows.contains_key(id))
            .ok_or(WindowError::NotFound)?;

        if op == WindowOp::Close {
            return self.close(id).map(ControlEffect::Closed);
        }

        let window = self.windows.get_mut(&id).ok_or(WindowError::NotFound)?;
        match op {
            WindowOp::QueryMaximized => {
                return Ok(ControlEffect::Maximized {
                    window: id,
                    maximized: window.maximized,
                });
            }
            WindowOp::Minimize => window.minimized = true,
            WindowOp::Maximize => {
                window.maximized = true;
                window.minimized = false;
            }
            WindowOp::Restore => {
                window.maximized = false;
                window.minimized = false;
            }
            WindowOp::Close => {}
        }

        debug!(window = %id, ?op, "control op applied");
        Ok(ControlEffect::Applied { window: id, op })
    }
}
