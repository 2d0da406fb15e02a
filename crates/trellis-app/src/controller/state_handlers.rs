//! Canonical state: incremental updates and snapshot pushes.

use tracing::{debug, warn};
use trellis_common::{StatePatch, WindowId};

use crate::protocol::ServerMessage;

use super::Controller;

impl Controller {
    /// Merge, then forward the same patch to everyone but the sender.
    pub(super) fn state_update(&mut self, origin: Option<WindowId>, patch: StatePatch) {
        if patch.is_empty() {
            debug!(origin = ?origin, "empty state patch ignored");
            return;
        }

        self.store.apply(&patch);
        let recipients = self
            .hub
            .broadcast_except(origin, &ServerMessage::StatePatch { patch });
        debug!(origin = ?origin, recipients, "state patch broadcast");
    }

    /// Push the full current state to a surface that just finished loading.
    pub(super) fn load_complete(&mut self, origin: Option<WindowId>) {
        let Some(window) = origin else {
            warn!("load-complete from unbound surface ignored");
            return;
        };
        if let Err(e) = self.windows.mark_loaded(window) {
            warn!(window = %window, error = %e, "load-complete ignored");
            return;
        }

        let state = self.store.snapshot();
        self.hub.send(window, ServerMessage::StateSnapshot { state });
        debug!(window = %window, "snapshot pushed");
    }
}
