//! Commands into the dispatcher and the handle that sends them.

use tokio::sync::{mpsc, oneshot};
use trellis_common::WindowId;

use crate::hub::Outbox;
use crate::protocol::{ClientMessage, Reply};

pub type Responder = oneshot::Sender<Reply>;

pub enum Command {
    /// A message from a surface. `origin` is the window its connection is
    /// bound to.
    Surface {
        origin: Option<WindowId>,
        message: ClientMessage,
        respond: Option<Responder>,
    },
    /// Bind a connection to a window. Answers whether the window is tracked.
    Attach {
        window: WindowId,
        outbox: Outbox,
        respond: oneshot::Sender<bool>,
    },
    /// A connection went away. Closes the window if it was still bound to it.
    Detach { window: WindowId, outbox: Outbox },
    Shutdown { done: Option<oneshot::Sender<()>> },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("dispatcher is not running")]
    Closed,

    #[error("dispatcher dropped the request without replying")]
    NoReply,
}

/// Cloneable front door to a running dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl DispatcherHandle {
    pub(super) fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    fn push(&self, command: Command) -> Result<(), DispatchError> {
        self.tx.send(command).map_err(|_| DispatchError::Closed)
    }

    /// Fire-and-forget.
    pub fn send(&self, origin: Option<WindowId>, message: ClientMessage) -> Result<(), DispatchError> {
        self.push(Command::Surface {
            origin,
            message,
            respond: None,
        })
    }

    /// Enqueue now, collect the reply later. Enqueue order is dispatch order.
    pub fn request(
        &self,
        origin: Option<WindowId>,
        message: ClientMessage,
    ) -> Result<oneshot::Receiver<Reply>, DispatchError> {
        let (respond, reply) = oneshot::channel();
        self.push(Command::Surface {
            origin,
            message,
            respond: Some(respond),
        })?;
        Ok(reply)
    }

    #[cfg(test)]
    pub async fn call(
        &self,
        origin: Option<WindowId>,
        message: ClientMessage,
    ) -> Result<Reply, DispatchError> {
        self.request(origin, message)?
            .await
            .map_err(|_| DispatchError::NoReply)
    }

    pub async fn attach(&self, window: WindowId, outbox: Outbox) -> Result<bool, DispatchError> {
        let (respond, tracked) = oneshot::channel();
        self.push(Command::Attach {
            window,
            outbox,
            respond,
        })?;
        tracked.await.map_err(|_| DispatchError::NoReply)
    }

    pub fn detach(&self, window: WindowId, outbox: Outbox) -> Result<(), DispatchError> {
        self.push(Command::Detach { window, outbox })
    }

    /// Stop the dispatcher and wait until every window is torn down.
    pub async fn shutdown(&self) -> Result<(), DispatchError> {
        let (done, finished) = oneshot::channel();
        self.push(Command::Shutdown { done: Some(done) })?;
        finished.await.map_err(|_| DispatchError::NoReply)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
