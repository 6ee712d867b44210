//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` defaults
//! - parses CLI arguments
//! - runs the pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::debug;

use crate::cli::{Command, ProcessArgs, SummaryArgs};
use crate::domain::PipelineConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is fine; env vars only provide defaults.
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }

    // We want `sales data.csv` to behave like `sales process --input data.csv`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Process(args) => handle_process(args),
        Command::Summary(args) => handle_summary(args),
    }
}

fn handle_process(args: ProcessArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args);
    let outcome = pipeline::run(&args.input, &args.user, &config);

    // Export the flat result before reporting errors, so callers always get a JSON object.
    if let Some(path) = &args.json {
        crate::io::export::write_result_json(path, &pipeline::into_result(&outcome))?;
    }
    let output = outcome?;

    println!("{}", crate::report::format_report(&output.report));

    if args.plot.plot {
        let plot = crate::plot::render_ascii_plot(
            &output.report.daily,
            Some(&output.forecast),
            args.plot.width,
            args.plot.height,
        );
        println!("{plot}");
    }

    if let Some(path) = &args.export_forecast {
        crate::io::export::write_forecast_csv(path, &output.report.forecast_tail)?;
    }

    Ok(())
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let summary = pipeline::run_summary(&args.input, args.reference_year)?;

    println!("{}", crate::report::format_statistics(&summary.statistics));
    println!(
        "{}",
        crate::report::format_summary_tables(&summary.daily, &summary.weekly)
    );

    if args.plot.plot {
        let plot = crate::plot::render_ascii_plot(&summary.daily, None, args.plot.width, args.plot.height);
        println!("{plot}");
    }

    Ok(())
}

pub fn pipeline_config_from_args(args: &ProcessArgs) -> PipelineConfig {
    PipelineConfig {
        reference_year: args.reference_year,
        horizon_days: args.horizon,
        charts_root: args.charts_dir.clone(),
        ..PipelineConfig::default()
    }
}

/// Rewrite argv so a bare CSV path runs the full pipeline.
///
/// Rules:
/// - `sales data.csv ...`            -> `sales process --input data.csv ...`
/// - `sales --help/--version/-h`     -> unchanged (show top-level help/version)
/// - `sales process ...` / `summary` -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "process" | "summary");
    if is_subcommand || arg1.starts_with('-') {
        return argv;
    }

    // Otherwise the first token is the input CSV.
    argv.splice(1..2, ["process".to_string(), "--input".to_string(), arg1]);
    argv
}
