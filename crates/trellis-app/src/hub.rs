//! Publish/subscribe fan-out to attached surfaces.
//!
//! Delivery is at-most-once: no acknowledgment and no replay. A message for
//! a surface that is not attached, or whose connection already went away,
//! is dropped.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use trellis_common::WindowId;

use crate::protocol::ServerMessage;

pub type Outbox = UnboundedSender<ServerMessage>;

#[derive(Debug, Default)]
pub struct SurfaceHub {
    outboxes: HashMap<WindowId, Outbox>,
}

impl SurfaceHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `window` to a connection. Replaces any previous binding.
    pub fn attach(&mut self, window: WindowId, outbox: Outbox) -> bool {
        let replaced = self.outboxes.insert(window, outbox).is_some();
        debug!(window = %window, replaced, "surface attached");
        replaced
    }

    pub fn detach(&mut self, window: WindowId) -> bool {
        self.outboxes.remove(&window).is_some()
    }

    /// Detach only if `window` is still bound to this exact connection.
    pub fn detach_if_current(&mut self, window: WindowId, outbox: &Outbox) -> bool {
        match self.outboxes.get(&window) {
            Some(current) if current.same_channel(outbox) => {
                self.outboxes.remove(&window);
                true
            }
            _ => false,
        }
    }

    pub fn is_attached(&self, window: WindowId) -> bool {
        self.outboxes.contains_key(&window)
    }

    pub fn attached(&self) -> Vec<WindowId> {
        let mut ids: Vec<_> = self.outboxes.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Deliver to one surface. Returns whether it was handed off.
    pub fn send(&self, window: WindowId, message: ServerMessage) -> bool {
        let Some(outbox) = self.outboxes.get(&window) else {
            debug!(window = %window, "message dropped: surface not attached");
            return false;
        };
        if outbox.send(message).is_err() {
            debug!(window = %window, "message dropped: connection gone");
            return false;
        }
        true
    }

    /// Deliver to every attached surface except `origin`. Exclusion is by
    /// window identity, never by payload. Returns the number handed off.
    pub fn broadcast_except(&self, origin: Option<WindowId>, message: &ServerMessage) -> usize {
        self.outboxes
            .iter()
            .filter(|(window, _)| Some(**window) != origin)
            .filter(|(window, outbox)| {
                let delivered = outbox.send(message.clone()).is_ok();
                if !delivered {
                    debug!(window = %window, "broadcast dropped: connection gone");
                }
                delivered
            })
            .count()
    }
}
