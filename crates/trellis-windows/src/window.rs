use serde::{Deserialize, Serialize};
use trellis_common::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowRole {
    Primary,
    Secondary,
}

/// `Creating -> Visible -> Closed`. Never moves backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Creating,
    Visible,
    Closed,
}

/// Per-window control operation, always applied to the calling surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowOp {
    Minimize,
    Maximize,
    Restore,
    Close,
    QueryMaximized,
}

impl WindowOp {
    pub fn past_tense(self) -> &'static str {
        match self {
            WindowOp::Minimize => "minimized",
            WindowOp::Maximize => "maximized",
            WindowOp::Restore => "restored",
            WindowOp::Close => "closed",
            WindowOp::QueryMaximized => "queried",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub id: WindowId,
    pub role: WindowRole,
    /// The primary, for secondaries created while it was alive.
    pub parent: Option<WindowId>,
    pub route: String,
    pub lifecycle: Lifecycle,
    pub maximized: bool,
    pub minimized: bool,
}

impl Window {
    pub(crate) fn new(
        id: WindowId,
        role: WindowRole,
        parent: Option<WindowId>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            id,
            role,
            parent,
            route: route.into(),
            lifecycle: Lifecycle::Creating,
            maximized: false,
            minimized: false,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.role == WindowRole::Primary
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle == Lifecycle::Closed
    }

    /// Move forward to `next`. Returns false if that would go backwards.
    pub(crate) fn advance(&mut self, next: Lifecycle) -> bool {
        if next < self.lifecycle {
            return false;
        }
        self.lifecycle = next;
        true
    }
}
