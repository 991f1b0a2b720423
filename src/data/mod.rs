//! Payload sources: the live forecast service and the offline sample generator.

pub mod client;
pub mod sample;

pub use client::{ForecastClient, Query};
pub use sample::{sample_interest, sample_price};
