//! Configuration schema types for Trellis.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with defaults that run a local development
//! shell without any config file.

mod ipc;
mod proxy;
mod system;
mod windows;

pub use ipc::*;
pub use proxy::*;
pub use system::*;
pub use windows::*;

use serde::{Deserialize, Serialize};
use trellis_common::CanonicalState;

/// Root configuration for Trellis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrellisConfig {
    pub ipc: IpcConfig,
    pub windows: WindowsConfig,
    /// Initial value of the shared state at process start.
    pub state: CanonicalState,
    pub proxy: ProxyConfig,
    pub logging: LoggingConfig,
}
