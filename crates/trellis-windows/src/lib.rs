//! Window lifecycle for Trellis.
//!
//! `WindowManager` owns the registry of presentation surfaces: one primary,
//! any number of secondaries parented to it. It allocates ids, applies
//! control operations, and cascades a primary close to every secondary.
//! Actually putting something on screen is delegated to a
//! `SurfaceLauncher`.

pub mod error;
pub mod launcher;
pub mod manager;
pub mod window;

pub use error::WindowError;
pub use launcher::{DetachedLauncher, ProcessLauncher, SurfaceLauncher};
pub use manager::{CloseOutcome, ControlEffect, WindowManager};
pub use window::{Lifecycle, Window, WindowOp, WindowRole};
