//! Export the visible window to CSV.
//!
//! One row per visible day; absent sides are written as empty cells.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::MergedPoint;
use crate::error::AppError;

/// Write windowed points to a CSV file.
pub fn write_window_csv(path: &Path, window: &[MergedPoint]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_window(&mut file, window)
        .map_err(|e| AppError::usage(format!("Failed to write export CSV: {e}")))?;
    tracing::info!(path = %path.display(), rows = window.len(), "exported window");
    Ok(())
}

fn write_window(out: &mut impl Write, window: &[MergedPoint]) -> std::io::Result<()> {
    writeln!(out, "date,observed,predicted,is_forecast")?;
    for p in window {
        writeln!(
            out,
            "{},{},{},{}",
            p.date,
            p.observed.map(|v| format!("{v:.4}")).unwrap_or_default(),
            p.predicted.map(|v| format!("{v:.4}")).unwrap_or_default(),
            p.is_forecast_only(),
        )?;
    }
    Ok(())
}
