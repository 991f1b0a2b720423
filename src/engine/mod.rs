//! Series engine: merge, pivot, window, insights.
//!
//! Every function here is pure and synchronous. Callers recompute from scratch
//! whenever a payload or a window magnitude changes; nothing is cached.

pub mod boundary;
pub mod insight;
pub mod merge;
pub mod window;

pub use boundary::*;
pub use insight::*;
pub use merge::*;
pub use window::*;
