//! Shared application state that every window mirrors.
//!
//! `CanonicalState` is the full record (used for snapshots and bootstrap
//! queries); `StatePatch` is the partial form carried by incremental
//! updates. Keeping them as distinct types is what separates "replace the
//! whole cache" from "merge these keys" on both ends of the channel.

use serde::{Deserialize, Serialize};

/// The complete shared state. Flat and versionless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalState {
    pub theme: String,
    pub counter: i64,
    pub language: String,
}

impl Default for CanonicalState {
    fn default() -> Self {
        Self {
            theme: "light".into(),
            counter: 0,
            language: "en".into(),
        }
    }
}

impl CanonicalState {
    /// Merge a patch key by key. Absent keys keep their current value.
    pub fn apply(&mut self, patch: &StatePatch) {
        if let Some(theme) = &patch.theme {
            self.theme.clone_from(theme);
        }
        if let Some(counter) = patch.counter {
            self.counter = counter;
        }
        if let Some(language) = &patch.language {
            self.language.clone_from(language);
        }
    }

    pub fn language_state(&self) -> LanguageState {
        LanguageState {
            language: self.language.clone(),
        }
    }
}

/// A partial update. Unknown keys are rejected at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl StatePatch {
    pub fn is_empty(&self) -> bool {
        self.theme.is_none() && self.counter.is_none() && self.language.is_none()
    }

    pub fn theme(theme: impl Into<String>) -> Self {
        Self {
            theme: Some(theme.into()),
            ..Default::default()
        }
    }

    pub fn counter(counter: i64) -> Self {
        Self {
            counter: Some(counter),
            ..Default::default()
        }
    }

    pub fn language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Default::default()
        }
    }
}

/// Answer to the language-only bootstrap query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageState {
    pub language: String,
}
