//! Read/write payload JSON files.
//!
//! Saved payloads carry a `"domain"` tag (see `domain::Payload`). Raw service
//! responses without the tag are accepted too, interpreted per the command's
//! domain, so `curl` output can be replayed directly.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::{Domain, InterestPayload, Payload, PricePayload};
use crate::error::AppError;

/// Write a payload JSON file (tagged form).
pub fn write_payload_json(path: &Path, payload: &Payload) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create payload JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, payload)
        .map_err(|e| AppError::usage(format!("Failed to write payload JSON: {e}")))?;
    tracing::info!(path = %path.display(), "saved payload");
    Ok(())
}

/// Read a payload JSON file for `domain`.
pub fn read_payload_json(path: &Path, domain: Domain) -> Result<Payload, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open payload JSON '{}': {e}", path.display())))?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::usage(format!("Invalid payload JSON: {e}")))?;
    parse_payload(value, domain)
}

fn parse_payload(value: serde_json::Value, domain: Domain) -> Result<Payload, AppError> {
    let payload = if value.get("domain").is_some() {
        serde_json::from_value::<Payload>(value)
            .map_err(|e| AppError::usage(format!("Invalid payload JSON: {e}")))?
    } else {
        match domain {
            Domain::Interest => serde_json::from_value::<InterestPayload>(value).map(Payload::Interest),
            Domain::Price => serde_json::from_value::<PricePayload>(value).map(Payload::Price),
        }
        .map_err(|e| AppError::usage(format!("Invalid {} payload JSON: {e}", domain.display_name())))?
    };

    if payload.domain() != domain {
        return Err(AppError::usage(format!(
            "Payload is a {} payload, expected {}.",
            payload.domain().display_name(),
            domain.display_name()
        )));
    }
    Ok(payload)
}
