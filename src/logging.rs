//! Tracing subscriber setup.
//!
//! `RUST_LOG` always wins. Without it, CLI commands log at `info` to stderr and
//! the TUI stays silent unless a log file was requested (stderr output would
//! tear the alternate screen).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

pub const DEFAULT_DIRECTIVE: &str = "plot_pulse=info";

/// Install a stderr subscriber for one-shot CLI commands.
pub fn init_stderr() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_DIRECTIVE.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Install a subscriber for the TUI.
///
/// With no `log_file`, nothing is installed and events are dropped.
pub fn init_tui(log_file: Option<&Path>) -> Result<(), AppError> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::usage(format!("Failed to open log file '{}': {e}", path.display())))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_DIRECTIVE.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
