//! Command-line parsing for the sales pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_HORIZON_DAYS, DEFAULT_REFERENCE_YEAR};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Sales summary, forecasting and charts from POS CSV exports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline: clean, aggregate, forecast, statistics, charts.
    Process(ProcessArgs),
    /// Clean and aggregate only; print the daily/weekly tails and statistics.
    Summary(SummaryArgs),
}

/// Options for `sales process`.
#[derive(Debug, Parser, Clone)]
pub struct ProcessArgs {
    /// Sales CSV export.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Namespace for chart files (one directory per user).
    #[arg(short, long, value_name = "NAMESPACE", default_value = "default")]
    pub user: String,

    /// Days to forecast past the last observed date.
    #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS, allow_negative_numbers = true)]
    pub horizon: i64,

    /// Root directory for chart files.
    #[arg(long, env = "SALES_CHARTS_DIR", default_value = "graphs")]
    pub charts_dir: PathBuf,

    /// Year assigned to the month/day dates in the CSV.
    #[arg(long, env = "SALES_REFERENCE_YEAR", default_value_t = DEFAULT_REFERENCE_YEAR)]
    pub reference_year: i32,

    /// Write the processing result (success or failure) as JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,

    /// Export the future forecast points to CSV.
    #[arg(long = "export-forecast", value_name = "CSV")]
    pub export_forecast: Option<PathBuf>,

    #[command(flatten)]
    pub plot: PlotArgs,
}

/// Options for `sales summary`.
#[derive(Debug, Parser, Clone)]
pub struct SummaryArgs {
    /// Sales CSV export.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Year assigned to the month/day dates in the CSV.
    #[arg(long, env = "SALES_REFERENCE_YEAR", default_value_t = DEFAULT_REFERENCE_YEAR)]
    pub reference_year: i32,

    #[command(flatten)]
    pub plot: PlotArgs,
}

/// Terminal plot options.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Render an ASCII plot of daily sales in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
