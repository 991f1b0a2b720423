//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the forecast family (`Domain`) and its window bounds (`WindowSpec`)
//! - observed/predicted/merged points
//! - derived summaries (`InsightSummary`, `Insight`)
//! - wire payloads as delivered by the forecast service (`payload`)

pub mod payload;
pub mod types;

pub use payload::*;
pub use types::*;
