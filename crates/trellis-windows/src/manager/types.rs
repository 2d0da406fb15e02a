//! Core types and accessors for WindowManager.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::task::JoinHandle;
use trellis_common::WindowId;

use crate::launcher::SurfaceLauncher;
use crate::window::{Window, WindowOp, WindowRole};

/// Tracks every live window and drives its launcher.
pub struct WindowManager {
    /// Registry of live windows. Closed windows are removed.
    pub(super) windows: BTreeMap<WindowId, Window>,
    pub(super) primary: Option<WindowId>,
    /// Next id to hand out. Shared by primary and secondaries, never reused.
    pub(super) next_id: u32,
    pub(super) launcher: Arc<dyn SurfaceLauncher>,
    /// In-flight launch per window. A terminate waits on it first.
    pub(super) launches: HashMap<WindowId, JoinHandle<()>>,
    /// In-flight terminate calls. Dropping the manager detaches every task
    /// rather than aborting it.
    pub(super) tasks: Vec<JoinHandle<()>>,
}

/// What `close` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseOutcome {
    /// Every window closed by this call, cascade included, primary last.
    pub closed: Vec<WindowId>,
    pub primary_closed: bool,
}

/// Result of a successful control operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEffect {
    /// Flags updated; the surface should perform `op` itself.
    Applied { window: WindowId, op: WindowOp },
    Closed(CloseOutcome),
    Maximized { window: WindowId, maximized: bool },
}

impl ControlEffect {
    pub fn message(&self) -> String {
        match self {
            ControlEffect::Applied { window, op } => format!("{window} {}", op.past_tense()),
            ControlEffect::Closed(outcome) => match outcome.closed.last() {
                Some(id) => format!("{id} closed"),
                None => "nothing to close".into(),
            },
            ControlEffect::Maximized { window, maximized } => {
                if *maximized {
                    format!("{window} is maximized")
                } else {
                    format!("{window} is not maximized")
                }
            }
        }
    }
}

impl WindowManager {
    pub fn new(launcher: Arc<dyn SurfaceLauncher>) -> Self {
        Self {
            windows: BTreeMap::new(),
            primary: None,
            next_id: 1,
            launcher,
            launches: HashMap::new(),
            tasks: Vec::new(),
        }
    }

    // -- Accessors --

    pub fn primary_id(&self) -> Option<WindowId> {
        self.primary
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Ids of all tracked windows, ascending.
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    /// Live secondaries, ascending by id.
    pub fn secondaries(&self) -> Vec<WindowId> {
        self.windows
            .values()
            .filter(|w| w.role == WindowRole::Secondary)
            .map(|w| w.id)
            .collect()
    }

    pub(super) fn allocate_id(&mut self) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        id
    }
}
