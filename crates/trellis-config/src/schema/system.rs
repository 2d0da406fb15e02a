//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive scoped to the trellis crates.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trellis=trace",
            LogLevel::Debug => "trellis=debug",
            LogLevel::Info => "trellis=info",
            LogLevel::Warning => "trellis=warn",
            LogLevel::Error => "trellis=error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
