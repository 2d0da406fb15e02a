use trellis_common::WindowId;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WindowError {
    /// The acting surface does not map to a tracked window.
    #[error("window not found")]
    NotFound,

    #[error("a primary window already exists ({0})")]
    PrimaryExists(WindowId),

    #[error("failed to launch {window}: {reason}")]
    Launch { window: WindowId, reason: String },

    #[error("failed to terminate {window}: {reason}")]
    Terminate { window: WindowId, reason: String },
}
