//! Input/output helpers.
//!
//! - payload JSON read/write (`payload`)
//! - windowed CSV export (`export`)

pub mod export;
pub mod payload;

pub use export::*;
pub use payload::*;
