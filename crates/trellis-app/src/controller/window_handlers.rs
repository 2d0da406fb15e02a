//! Window lifecycle and surface binding.

use tracing::{info, warn};
use trellis_common::WindowId;
use trellis_windows::{CloseOutcome, ControlEffect, WindowOp};

use crate::hub::Outbox;
use crate::protocol::{ControlReply, Reply, ServerMessage};

use super::command::Responder;
use super::dispatch::reply;
use super::{Controller, Flow};

impl Controller {
    pub(super) fn open_secondary(&mut self, route: &str) -> Reply {
        let window = self.windows.create_secondary(route);
        Reply::Control(ControlReply::ok(format!("opened {window}")))
    }

    pub(super) fn close_most_recent_secondary(&mut self) -> Reply {
        match self.windows.close_most_recent_secondary() {
            Some(window) => {
                self.notify_closed(&[window]);
                Reply::Control(ControlReply::ok(format!("closed {window}")))
            }
            None => Reply::Control(ControlReply::failed("no secondary window to close")),
        }
    }

    /// Apply `op` to the caller's own window. Failures become
    /// `{success: false}`, never an error.
    pub(super) fn window_op(
        &mut self,
        origin: Option<WindowId>,
        op: WindowOp,
        respond: Option<Responder>,
    ) -> Flow {
        let effect = match self.windows.control(origin, op) {
            Ok(effect) => effect,
            Err(e) => {
                warn!(origin = ?origin, ?op, error = %e, "window op rejected");
                reply(respond, Reply::Control(ControlReply::failed(e.to_string())));
                return Flow::Continue;
            }
        };

        let message = effect.message();
        match effect {
            ControlEffect::Applied { window, op } => {
                self.hub.send(window, ServerMessage::WindowCommand { op });
                reply(respond, Reply::Control(ControlReply::ok(message)));
                Flow::Continue
            }
            ControlEffect::Maximized { maximized, .. } => {
                reply(
                    respond,
                    Reply::Control(ControlReply {
                        success: true,
                        message,
                        maximized: Some(maximized),
                    }),
                );
                Flow::Continue
            }
            ControlEffect::Closed(outcome) => {
                reply(respond, Reply::Control(ControlReply::ok(message)));
                self.after_close(&outcome)
            }
        }
    }

    /// Tell every closed window to go away; stop if the primary went with
    /// them and the controller is configured to exit.
    pub(super) fn after_close(&mut self, outcome: &CloseOutcome) -> Flow {
        self.notify_closed(&outcome.closed);
        if outcome.primary_closed && self.exit_on_primary_close {
            info!("primary window closed; stopping controller");
            return Flow::Stop(None);
        }
        Flow::Continue
    }

    pub(super) fn attach(&mut self, window: WindowId, outbox: Outbox) -> bool {
        if !self.windows.contains(window) {
            warn!(window = %window, "attach for untracked window refused");
            return false;
        }
        if self.hub.attach(window, outbox) {
            info!(window = %window, "surface reconnected");
        }
        true
    }

    /// A surface connection ended. If it was still the live binding for its
    /// window, that window closes.
    pub(super) fn detach(&mut self, window: WindowId, outbox: &Outbox) -> Flow {
        if !self.hub.detach_if_current(window, outbox) {
            return Flow::Continue;
        }
        match self.windows.close(window) {
            Ok(outcome) => {
                info!(window = %window, "surface disconnected; window closed");
                self.after_close(&outcome)
            }
            Err(_) => Flow::Continue,
        }
    }
}
