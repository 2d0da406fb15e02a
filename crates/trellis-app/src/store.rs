//! The Canonical State Store. Owned by the dispatcher; never shared.

use trellis_common::{CanonicalState, LanguageState, StatePatch};

#[derive(Debug, Default)]
pub struct StateStore {
    state: CanonicalState,
}

impl StateStore {
    pub fn new(initial: CanonicalState) -> Self {
        Self { state: initial }
    }

    /// Merge `patch` key by key, last write wins.
    pub fn apply(&mut self, patch: &StatePatch) -> &CanonicalState {
        self.state.apply(patch);
        &self.state
    }

    /// A fresh copy of the current state. Computed on every call.
    pub fn snapshot(&self) -> CanonicalState {
        self.state.clone()
    }

    pub fn language(&self) -> LanguageState {
        self.state.language_state()
    }
}
