//! The controller: sole owner of the state store, service registry, window
//! manager, and surface hub.
//!
//! It runs as a single task that handles one command to completion before
//! taking the next, which is what gives state updates a total order and
//! keeps each merge-then-broadcast from interleaving with anything else.
//! Network I/O is the only work moved off that task.

mod command;
mod dispatch;
mod proxy_handlers;
mod state_handlers;
mod window_handlers;


pub use command::DispatcherHandle;

use command::Command;

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use trellis_common::{TrellisError, WindowId};
use trellis_config::TrellisConfig;
use trellis_proxy::{ProxyRouter, ServiceRegistry};
use trellis_windows::{SurfaceLauncher, WindowManager};

use crate::hub::SurfaceHub;
use crate::protocol::ServerMessage;
use crate::store::StateStore;

/// Whether the dispatcher loop keeps running after a command.
pub enum Flow {
    Continue,
    /// Stop, acknowledging the requester if there is one.
    Stop(Option<oneshot::Sender<()>>),
}

#[cfg(test)]
impl Flow {
    pub fn is_stop(&self) -> bool {
        matches!(self, Flow::Stop(_))
    }
}

pub struct Controller {
    store: StateStore,
    registry: ServiceRegistry,
    router: ProxyRouter,
    windows: WindowManager,
    hub: SurfaceHub,
    exit_on_primary_close: bool,
    shut_down: bool,
}

impl Controller {
    /// Build every component and create the primary window.
    ///
    /// Must run inside a tokio runtime: the primary starts launching
    /// immediately.
    pub fn init(
        config: &TrellisConfig,
        launcher: Arc<dyn SurfaceLauncher>,
    ) -> Result<Self, TrellisError> {
        let router = ProxyRouter::from_config(&config.proxy)
            .map_err(|e| TrellisError::Proxy(format!("failed to build HTTP client: {e}")))?;
        let registry = ServiceRegistry::from_config(&config.proxy);

        let mut windows = WindowManager::new(launcher);
        let primary = windows
            .create_primary(&config.windows.primary_route)
            .map_err(|e| TrellisError::Window(e.to_string()))?;

        info!(
            primary = %primary,
            services = registry.len(),
            "controller initialized"
        );

        Ok(Self {
            store: StateStore::new(config.state.clone()),
            registry,
            router,
            windows,
            hub: SurfaceHub::new(),
            exit_on_primary_close: config.windows.exit_on_primary_close,
            shut_down: false,
        })
    }

    /// Move the controller onto its own task.
    pub fn spawn(self) -> (DispatcherHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx));
        (DispatcherHandle::new(tx), task)
    }

    async fn run(mut self, mut rx: UnboundedReceiver<Command>) {
        info!("dispatcher started");
        let mut ack = None;
        while let Some(command) = rx.recv().await {
            if let Flow::Stop(done) = self.handle_command(command) {
                ack = done;
                break;
            }
        }
        rx.close();

        self.shutdown().await;
        if let Some(done) = ack {
            let _ = done.send(());
        }
        info!("dispatcher stopped");
    }

    /// Destroy every window and tell attached surfaces to go away.
    ///
    /// Idempotent.
    pub async fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        info!("controller shutting down");

        let destroyed = self.windows.destroy_all();
        self.notify_closed(&destroyed);
        self.windows.flush().await;

        info!(windows = destroyed.len(), "controller shutdown complete");
    }

    /// Send `close` to each window and drop its binding.
    fn notify_closed(&mut self, windows: &[WindowId]) {
        for window in windows {
            self.hub.send(*window, ServerMessage::Close);
            self.hub.detach(*window);
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if !self.shut_down {
            warn!("controller dropped without shutdown; destroying windows");
            let destroyed = self.windows.destroy_all();
            self.notify_closed(&destroyed);
        }
    }
}
