use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Short hex id used to tie together the log lines of one proxied call.
pub fn new_correlation_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}

/// Identifier of a presentation surface, unique for the process lifetime.
///
/// Allocated from a monotonic counter and never reused, so a closed window
/// can only come back under a new id. On the wire it is the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

impl WindowId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

impl FromStr for WindowId {
    type Err = std::num::ParseIntError;

    /// Accepts both `window-7` and `7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("window-").unwrap_or(s);
        digits.parse().map(WindowId)
    }
}
