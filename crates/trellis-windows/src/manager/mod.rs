//! The WindowManager tracks windows, parentage, control flags, and cascade.

mod control;
mod operations;
mod types;

pub use types::*;
