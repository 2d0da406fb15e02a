//! Create, close, and teardown operations for WindowManager.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use trellis_common::WindowId;

use crate::error::WindowError;
use crate::window::{Lifecycle, Window, WindowRole};

use super::types::{CloseOutcome, WindowManager};

impl WindowManager {
    /// Register the primary window and start launching it.
    pub fn create_primary(&mut self, route: &str) -> Result<WindowId, WindowError> {
        if let Some(existing) = self.primary {
            return Err(WindowError::PrimaryExists(existing));
        }

        let id = self.allocate_id();
        let window = Window::new(id, WindowRole::Primary, None, route);
        self.windows.insert(id, window.clone());
        self.primary = Some(id);
        info!(window = %id, route, "primary window created");

        self.spawn_launch(window);
        Ok(id)
    }

    /// Register a secondary window parented to the live primary, if any.
    pub fn create_secondary(&mut self, route: &str) -> WindowId {
        let parent = self.primary;
        let id = self.allocate_id();
        let window = Window::new(id, WindowRole::Secondary, parent, route);
        self.windows.insert(id, window.clone());
        info!(window = %id, route, parent = ?parent, "secondary window created");

        self.spawn_launch(window);
        id
    }

    /// Close the live secondary with the greatest id. `None` if there is none.
    pub fn close_most_recent_secondary(&mut self) -> Option<WindowId> {
        let id = self.secondaries().into_iter().max()?;
        self.retire(id);
        Some(id)
    }

    /// Close one window. Closing the primary closes every secondary first
    /// and leaves the registry empty.
    pub fn close(&mut self, id: WindowId) -> Result<CloseOutcome, WindowError> {
        let window = self.windows.get(&id).ok_or(WindowError::NotFound)?;

        if !window.is_primary() {
            self.retire(id);
            return Ok(CloseOutcome {
                closed: vec![id],
                primary_closed: false,
            });
        }

        let mut closed = Vec::new();
        for secondary in self.secondaries() {
            self.retire(secondary);
            closed.push(secondary);
        }
        self.retire(id);
        closed.push(id);

        self.windows.clear();
        self.primary = None;
        info!(window = %id, cascaded = closed.len() - 1, "primary closed");

        Ok(CloseOutcome {
            closed,
            primary_closed: true,
        })
    }

    /// The surface finished loading its content.
    pub fn mark_loaded(&mut self, id: WindowId) -> Result<&Window, WindowError> {
        let window = self.windows.get_mut(&id).ok_or(WindowError::NotFound)?;
        if window.lifecycle == Lifecycle::Creating {
            window.advance(Lifecycle::Visible);
            debug!(window = %id, "window visible");
        }
        Ok(window)
    }

    /// Force-destroy every tracked window regardless of state.
    ///
    /// Safe to call repeatedly; later calls find nothing to do.
    pub fn destroy_all(&mut self) -> Vec<WindowId> {
        let ids = self.ids();
        for id in &ids {
            self.retire(*id);
        }
        self.windows.clear();
        self.primary = None;
        if !ids.is_empty() {
            info!(count = ids.len(), "all windows destroyed");
        }
        ids
    }

    /// Wait for every in-flight launch and terminate call.
    pub async fn flush(&mut self) {
        let launches = std::mem::take(&mut self.launches).into_values();
        for task in launches.chain(std::mem::take(&mut self.tasks)) {
            if let Err(e) = task.await {
                warn!(error = %e, "launcher task panicked or was cancelled");
            }
        }
    }

    fn retire(&mut self, id: WindowId) {
        let Some(mut window) = self.windows.remove(&id) else {
            return;
        };
        window.advance(Lifecycle::Closed);
        debug!(window = %id, role = ?window.role, "window closed");
        self.spawn_terminate(id);
    }

    fn spawn_launch(&mut self, window: Window) {
        let id = window.id;
        let launcher = Arc::clone(&self.launcher);
        let task = spawn_on_runtime(id, async move {
            if let Err(e) = launcher.launch(&window).await {
                error!(window = %window.id, error = %e, "surface launch failed");
            }
        });

        self.launches.retain(|_, t| !t.is_finished());
        if let Some(task) = task {
            self.launches.insert(id, task);
        }
    }

    /// Terminate only after the window's launch has settled, so a surface
    /// that finishes starting after the close is still stopped.
    fn spawn_terminate(&mut self, id: WindowId) {
        let launcher = Arc::clone(&self.launcher);
        let launch = self.launches.remove(&id);
        let task = spawn_on_runtime(id, async move {
            if let Some(launch) = launch {
                if let Err(e) = launch.await {
                    warn!(window = %id, error = %e, "launch task panicked or was cancelled");
                }
            }
            if let Err(e) = launcher.terminate(id).await {
                warn!(window = %id, error = %e, "surface terminate failed");
            }
        });

        self.tasks.retain(|t| !t.is_finished());
        if let Some(task) = task {
            self.tasks.push(task);
        }
    }
}

fn spawn_on_runtime<F>(id: WindowId, task: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = ()> + Send + 'static,
{
    // Teardown from a `Drop` impl may run after the runtime is gone.
    let Ok(runtime) = Handle::try_current() else {
        warn!(window = %id, "no async runtime; launcher call skipped");
        return None;
    };
    Some(runtime.spawn(task))
}
