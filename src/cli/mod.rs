//! Command-line parsing for the forecast viewer.
//!
//! Only argument shapes live here; dispatch is in `app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Domain;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pulse", version, about = "Topic-interest and price forecast viewer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show Wikipedia interest history and projection for a topic.
    Interest(InterestArgs),
    /// Show price history and projection for a product link.
    Price(PriceArgs),
    /// Launch the interactive TUI.
    Tui(TuiArgs),
}

#[derive(Debug, Args, Clone)]
pub struct InterestArgs {
    /// Wikipedia topic (e.g. "Bitcoin" or "Python (programming language)").
    pub keyword: String,

    /// Months of history to show (clamped to 3..=48).
    #[arg(long, default_value_t = 12)]
    pub history: u32,

    /// Months of prediction to show (clamped to 1..=12).
    #[arg(long, default_value_t = 6)]
    pub predict: u32,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct PriceArgs {
    /// Product page URL.
    pub url: String,

    /// Months of prediction to show (clamped to 1..=12).
    #[arg(long, default_value_t = 12)]
    pub predict: u32,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Payload source and output options shared by the one-shot commands.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Read the payload from a JSON file instead of calling the forecast service.
    #[arg(long, value_name = "JSON", conflicts_with = "demo")]
    pub payload: Option<PathBuf>,

    /// Save the payload that was used to a JSON file.
    #[arg(long = "save-payload", value_name = "JSON")]
    pub save_payload: Option<PathBuf>,

    /// Use a synthetic payload (no network).
    #[arg(long)]
    pub demo: bool,

    /// Seed for the synthetic payload.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Export the visible window to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Maximum rows in the window table (0 hides the table).
    #[arg(long, default_value_t = 12)]
    pub rows: usize,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Forecast family to start on.
    #[arg(short = 'd', long, value_enum, default_value_t = Domain::Interest)]
    pub domain: Domain,

    /// Initial topic or product URL; fetched on start.
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Initial months of history (interest only, clamped to 3..=48).
    #[arg(long, default_value_t = 12)]
    pub history: u32,

    /// Initial months of prediction (clamped to 1..=12).
    #[arg(long, default_value_t = 6)]
    pub predict: u32,

    /// Quiet period before a submitted query is sent.
    #[arg(long, default_value_t = 250)]
    pub debounce_ms: u64,

    /// Use synthetic payloads (no network).
    #[arg(long)]
    pub demo: bool,

    /// Seed for synthetic payloads.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write logs to this file (the TUI is silent otherwise).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interest_defaults() {
        let cli = Cli::parse_from(["pulse", "interest", "Bitcoin"]);
        let Command::Interest(args) = cli.command else {
            panic!("expected interest command");
        };
        assert_eq!(args.keyword, "Bitcoin");
        assert_eq!((args.history, args.predict), (12, 6));
        assert!(args.output.plot && !args.output.no_plot);
    }

    #[test]
    fn payload_conflicts_with_demo() {
        let res = Cli::try_parse_from(["pulse", "price", "https://x.test", "--demo", "--payload", "p.json"]);
        assert!(res.is_err());
    }

    #[test]
    fn tui_domain_flag() {
        let cli = Cli::parse_from(["pulse", "tui", "-d", "price", "--demo"]);
        let Command::Tui(args) = cli.command else {
            panic!("expected tui command");
        };
        assert_eq!(args.domain, Domain::Price);
        assert!(args.demo);
    }
}
