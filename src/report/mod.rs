//! Reporting utilities: insight cards, sales watchlist, and window tables.

pub mod format;

pub use format::*;
