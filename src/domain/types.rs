//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while a file is processed
//! - exported to JSON/CSV
//! - handed to an outer layer (web session, notebook, etc.) unchanged

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Amount columns every sales export must carry, in validation order.
pub const AMOUNT_COLUMNS: [&str; 6] = ["Food", "Drink", "Modifier", "Gross", "Tax", "Total"];

/// Canonical name of the date-fragment column (used in error messages).
pub const DATE_COLUMN: &str = "Date";

/// Year appended to `MM/DD` fragments. Source exports omit the year.
pub const DEFAULT_REFERENCE_YEAR: i32 = 2024;

/// Default number of days forecast past the last observed date.
pub const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Number of trailing weekly forecast averages reported.
pub const DEFAULT_WEEKLY_FORECAST_WEEKS: usize = 5;

/// One CSV row exactly as read, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSalesRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    /// `MM/DD` fragment with no year.
    pub date: String,
    pub food: String,
    pub drink: String,
    pub modifier: String,
    pub gross: String,
    pub tax: String,
    pub total: String,
}

impl RawSalesRow {
    /// Amount fields paired with their column names, in `AMOUNT_COLUMNS` order.
    pub fn amount_fields(&self) -> [(&'static str, &str); 6] {
        [
            (AMOUNT_COLUMNS[0], self.food.as_str()),
            (AMOUNT_COLUMNS[1], self.drink.as_str()),
            (AMOUNT_COLUMNS[2], self.modifier.as_str()),
            (AMOUNT_COLUMNS[3], self.gross.as_str()),
            (AMOUNT_COLUMNS[4], self.tax.as_str()),
            (AMOUNT_COLUMNS[5], self.total.as_str()),
        ]
    }
}

/// A cleaned sales row: calendar date plus numeric amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub food: f64,
    pub drink: f64,
    pub modifier: f64,
    pub gross: f64,
    pub tax: f64,
    pub total: f64,
}

/// Total sales for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: f64,
}

/// Total sales for one Monday-based week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotal {
    pub week_start: NaiveDate,
    pub total: f64,
}

/// Model output for a single day: central estimate plus a two-sided interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Forecast over the historical dates followed by `horizon` future days.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub horizon: usize,
}

impl Forecast {
    /// Fitted values over the observed history.
    pub fn history(&self) -> &[ForecastPoint] {
        let split = self.points.len().saturating_sub(self.horizon);
        &self.points[..split]
    }

    /// The last `horizon` entries (future days only).
    pub fn tail(&self) -> &[ForecastPoint] {
        let split = self.points.len().saturating_sub(self.horizon);
        &self.points[split..]
    }
}

/// Mean point estimate over the forecast days falling in one week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyForecast {
    pub week_start: NaiveDate,
    pub average_estimate: f64,
}

/// Scalar statistics over the daily totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: f64,
    pub average: f64,
    pub maximum: f64,
    pub minimum: f64,
    pub day_count: usize,
}

/// Pipeline stage names, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Ingest,
    Forecast,
    Statistics,
    Charts,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Forecast => "forecast",
            Stage::Statistics => "statistics",
            Stage::Charts => "charts",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a successful run produces, in display-ready form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub daily: Vec<DailyTotal>,
    pub weekly: Vec<WeeklyTotal>,
    /// The future part of the forecast (last `horizon` points).
    pub forecast_tail: Vec<ForecastPoint>,
    pub weekly_forecast: Vec<WeeklyForecast>,
    /// Chart name -> path relative to the charts root.
    pub chart_paths: BTreeMap<String, String>,
    pub statistics: Statistics,
}

/// The single object handed to the outer (web/session) layer.
///
/// On success `report` is populated and flattened into the JSON object;
/// on failure only `stage` and `error` are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub success: bool,
    #[serde(flatten)]
    pub report: Option<SalesReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A seasonal component expressed as a Fourier series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub name: String,
    /// Period length in days.
    pub period_days: f64,
    pub fourier_order: usize,
}

/// Configuration of the native seasonal-trend forecasting model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Maximum number of potential trend changepoints.
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    /// Prior scale for trend slope changes (smaller = stiffer trend).
    pub changepoint_prior_scale: f64,
    /// Prior scale for seasonal Fourier coefficients.
    pub seasonality_prior_scale: f64,
    pub daily_seasonality: bool,
    pub weekly_seasonality: bool,
    /// Off by default: histories are usually much shorter than a year.
    pub yearly_seasonality: bool,
    /// Coverage of the uncertainty interval (e.g. 0.80).
    pub interval_width: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            daily_seasonality: true,
            weekly_seasonality: true,
            yearly_seasonality: false,
            interval_width: 0.80,
        }
    }
}

impl ModelConfig {
    /// Enabled seasonal components.
    pub fn seasonalities(&self) -> Vec<Seasonality> {
        let mut out = Vec::new();
        if self.yearly_seasonality {
            out.push(Seasonality {
                name: "yearly".to_string(),
                period_days: 365.25,
                fourier_order: 10,
            });
        }
        if self.weekly_seasonality {
            out.push(Seasonality {
                name: "weekly".to_string(),
                period_days: 7.0,
                fourier_order: 3,
            });
        }
        if self.daily_seasonality {
            out.push(Seasonality {
                name: "daily".to_string(),
                period_days: 1.0,
                fourier_order: 4,
            });
        }
        out
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub reference_year: i32,
    pub horizon_days: i64,
    /// Directory under which per-namespace chart folders are created.
    pub charts_root: PathBuf,
    pub weekly_forecast_weeks: usize,
    pub model: ModelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_year: DEFAULT_REFERENCE_YEAR,
            horizon_days: DEFAULT_HORIZON_DAYS,
            charts_root: PathBuf::from("graphs"),
            weekly_forecast_weeks: DEFAULT_WEEKLY_FORECAST_WEEKS,
            model: ModelConfig::default(),
        }
    }
}
