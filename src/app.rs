//! Command dispatch for the `pulse` binary.
//!
//! `src/main.rs` only maps the result to an exit code. This module:
//! - parses CLI arguments
//! - obtains a payload (service, saved JSON, or synthetic sample)
//! - builds the merged view and applies the window
//! - prints reports/plots
//! - writes optional exports

use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::app::pipeline::ForecastView;
use crate::cli::{Command, InterestArgs, OutputArgs, PriceArgs};
use crate::data::{ForecastClient, Query};
use crate::domain::{Domain, Payload, WindowSpec};
use crate::error::AppError;

pub mod pipeline;
pub mod request;

/// Entry point for the `pulse` binary.
pub fn run() -> Result<(), AppError> {
    // We want `pulse` and `pulse -d price` to behave like `pulse tui ...`.
    //
    // Clap needs the subcommand name, so argv is patched before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Interest(args) => {
            crate::logging::init_stderr();
            handle_interest(args)
        }
        Command::Price(args) => {
            crate::logging::init_stderr();
            handle_price(args)
        }
        Command::Tui(args) => {
            crate::logging::init_tui(args.log_file.as_deref())?;
            crate::tui::run(args)
        }
    }
}

fn handle_interest(args: InterestArgs) -> Result<(), AppError> {
    let spec = WindowSpec::new(Domain::Interest, args.history, args.predict);
    let query = Query::Interest(args.keyword.clone());
    let payload = load_payload(&query, &args.output)?;
    render(&payload, &spec, &args.output)
}

fn handle_price(args: PriceArgs) -> Result<(), AppError> {
    let spec = WindowSpec::new(Domain::Price, 0, args.predict);
    let query = Query::Price(args.url.clone());
    let payload = load_payload(&query, &args.output)?;
    render(&payload, &spec, &args.output)
}

fn load_payload(query: &Query, output: &OutputArgs) -> Result<Payload, AppError> {
    let payload = if let Some(path) = &output.payload {
        crate::io::read_payload_json(path, query.domain())?
    } else if output.demo {
        sample_payload(query, today(), output.seed)?
    } else {
        ForecastClient::from_env()?.fetch(query)?
    };

    if let Some(path) = &output.save_payload {
        crate::io::write_payload_json(path, &payload)?;
    }
    Ok(payload)
}

fn render(payload: &Payload, spec: &WindowSpec, output: &OutputArgs) -> Result<(), AppError> {
    let view = ForecastView::from_payload(payload);
    let window = view.window(spec);

    println!("{}", crate::report::format_summary(&view, spec));

    if output.plot && !output.no_plot {
        let plot = crate::plot::render_window_plot(
            window,
            view.pivot_in_window(spec),
            output.width,
            output.height,
            view.domain.value_label(),
        );
        println!("{plot}");
    }

    if output.rows > 0 {
        println!("{}", crate::report::format_window_table(window, output.rows));
    }

    if let Some(path) = &output.export {
        crate::io::write_window_csv(path, window)?;
    }

    Ok(())
}

/// Synthetic payload for `query`, anchored on `today`.
pub fn sample_payload(query: &Query, today: NaiveDate, seed: u64) -> Result<Payload, AppError> {
    match query {
        Query::Interest(keyword) => crate::data::sample_interest(keyword, today, seed).map(Payload::Interest),
        Query::Price(url) => crate::data::sample_price(url, today, seed).map(Payload::Price),
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Rewrite argv so `pulse` defaults to `pulse tui`.
///
/// Rules:
/// - `pulse`                      -> `pulse tui`
/// - `pulse -d price ...`         -> `pulse tui -d price ...`
/// - `pulse --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "interest" | "price" | "tui");
    if is_subcommand {
        return argv;
    }

    // Leading flags belong to the TUI.
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["pulse"])), argv(&["pulse", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["pulse", "-d", "price"])),
            argv(&["pulse", "tui", "-d", "price"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(
            rewrite_args(argv(&["pulse", "interest", "Bitcoin"])),
            argv(&["pulse", "interest", "Bitcoin"])
        );
        assert_eq!(rewrite_args(argv(&["pulse", "--help"])), argv(&["pulse", "--help"]));
    }

    #[test]
    fn demo_payload_matches_query_domain() {
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let p = sample_payload(&Query::Price("https://x.test".into()), day, 1).unwrap();
        assert_eq!(p.domain(), Domain::Price);
        let p = sample_payload(&Query::Interest("Rust".into()), day, 1).unwrap();
        assert_eq!(p.domain(), Domain::Interest);
    }
}
