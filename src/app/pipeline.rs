//! Shared pipeline logic used by the CLI commands and by library callers.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> aggregate -> (forecast || statistics) -> charts -> report
//!
//! Every failure is tagged with the stage that raised it and short-circuits
//! the run; there is no partial output.

use std::path::Path;
use std::time::Instant;

use tracing::{info, info_span, warn};

use crate::aggregate;
use crate::domain::{
    DailyTotal, Forecast, PipelineConfig, ProcessingResult, SalesReport, Stage, Statistics, WeeklyTotal,
};
use crate::error::{PipelineError, StageError};
use crate::forecast::{ForecastBackend, SeasonalTrendModel, run_forecast};
use crate::io::ingest::load_sales_records;
use crate::plot::ChartRenderer;
use crate::report::summarize;

/// All computed outputs of a single `sales process` run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub report: SalesReport,
    /// The complete forecast (history fit + future days).
    pub forecast: Forecast,
}

/// Outputs of `sales summary`: no forecast and no charts.
#[derive(Debug, Clone)]
pub struct SummaryOutput {
    pub daily: Vec<DailyTotal>,
    pub weekly: Vec<WeeklyTotal>,
    pub statistics: Statistics,
}

/// Run the full pipeline with the built-in seasonal-trend model.
pub fn run(path: &Path, namespace: &str, config: &PipelineConfig) -> Result<PipelineOutput, StageError> {
    let backend = SeasonalTrendModel::new(config.model.clone());
    run_with_backend(&backend, path, namespace, config)
}

/// Run the full pipeline with any forecasting backend.
pub fn run_with_backend<B: ForecastBackend>(
    backend: &B,
    path: &Path,
    namespace: &str,
    config: &PipelineConfig,
) -> Result<PipelineOutput, StageError> {
    let span = info_span!("process", namespace, input = %path.display());
    let _enter = span.enter();
    let started = Instant::now();

    let (daily, weekly) = ingest_and_aggregate(path, config.reference_year)?;

    // Forecast and statistics only read the daily series. When both fail
    // (e.g. no rows at all) the forecast error is reported.
    let (forecast, statistics) = rayon::join(
        || run_forecast(backend, &daily, config.horizon_days),
        || summarize(&daily),
    );
    let forecast = forecast.map_err(|e| StageError::new(Stage::Forecast, e))?;
    let statistics = statistics.map_err(|e| StageError::new(Stage::Statistics, e))?;

    let renderer = ChartRenderer::new(&config.charts_root);
    let chart_paths = renderer
        .render(&daily, &weekly, Some(&forecast), namespace)
        .map_err(|e| StageError::new(Stage::Charts, e))?;

    // Weeks straddling the last observed day average fitted and future estimates.
    let weekly_forecast = aggregate::weekly_forecast(&forecast.points, config.weekly_forecast_weeks);
    let report = SalesReport {
        daily,
        weekly,
        forecast_tail: forecast.tail().to_vec(),
        weekly_forecast,
        chart_paths,
        statistics,
    };

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        days = report.daily.len(),
        weeks = report.weekly.len(),
        charts = report.chart_paths.len(),
        "pipeline finished"
    );

    Ok(PipelineOutput { report, forecast })
}

/// Ingest, aggregate, and summarize without forecasting or charts.
pub fn run_summary(path: &Path, reference_year: i32) -> Result<SummaryOutput, StageError> {
    let span = info_span!("summary", input = %path.display());
    let _enter = span.enter();

    let (daily, weekly) = ingest_and_aggregate(path, reference_year)?;
    let statistics = summarize(&daily).map_err(|e| StageError::new(Stage::Statistics, e))?;
    Ok(SummaryOutput {
        daily,
        weekly,
        statistics,
    })
}

/// The outer-layer entry point: never fails, reports the failing stage instead.
pub fn process(path: &Path, namespace: &str, config: &PipelineConfig) -> ProcessingResult {
    into_result(&run(path, namespace, config))
}

/// Convert a typed run outcome into the flat result object.
pub fn into_result(outcome: &Result<PipelineOutput, StageError>) -> ProcessingResult {
    match outcome {
        Ok(output) => ProcessingResult {
            success: true,
            report: Some(output.report.clone()),
            stage: None,
            error: None,
        },
        Err(err) => {
            warn!(stage = %err.stage, error = %err.source, "pipeline failed");
            failure(err.stage, &err.source)
        }
    }
}

/// A failure result with no partial data.
pub fn failure(stage: Stage, error: &PipelineError) -> ProcessingResult {
    ProcessingResult {
        success: false,
        report: None,
        stage: Some(stage),
        error: Some(error.to_string()),
    }
}

fn ingest_and_aggregate(path: &Path, reference_year: i32) -> Result<(Vec<DailyTotal>, Vec<WeeklyTotal>), StageError> {
    let records = load_sales_records(path, reference_year).map_err(|e| StageError::new(Stage::Ingest, e))?;

    let daily = aggregate::daily(&records);
    let weekly = aggregate::weekly(&records);
    info!(records = records.len(), days = daily.len(), weeks = weekly.len(), "aggregated");

    Ok((daily, weekly))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const HEADER: &str = ",Food,Drink,Modifier,Gross,Tax,Total\n";

    fn write_csv(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("sales.csv");
        fs::write(&path, format!("{HEADER}{body}")).unwrap();
        path
    }

    fn config(dir: &Path) -> PipelineConfig {
        PipelineConfig {
            charts_root: dir.join("graphs"),
            ..PipelineConfig::default()
        }
    }

    fn three_weeks() -> String {
        (0..21)
            .map(|i| {
                let day = 1 + i;
                let amount = 100.0 + (i % 7) as f64 * 12.5;
                format!("01/{day:02},{amount:.2},0,0,{amount:.2},0,${amount:.2}\n")
            })
            .collect()
    }

    #[test]
    fn successful_run_has_charts_and_forecast_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), &three_weeks());
        let out = run(&path, "alice", &config(dir.path())).unwrap();

        assert_eq!(out.report.daily.len(), 21);
        assert_eq!(out.report.forecast_tail.len(), 30);
        assert_eq!(out.forecast.points.len(), 51);
        assert_eq!(out.report.chart_paths.len(), 4);
        assert!(out.report.weekly_forecast.len() <= 5);
        for rel in out.report.chart_paths.values() {
            assert!(dir.path().join("graphs").join(rel).is_file(), "{rel}");
        }
    }

    #[test]
    fn weekly_forecast_averages_history_and_future_in_boundary_week() {
        let dir = tempfile::tempdir().unwrap();
        // Jan 1..10 2024; the week of Monday Jan 8 holds 3 fitted and 4 future days.
        let body: String = (1..=10)
            .map(|day| format!("01/{day:02},0,0,0,0,0,{}\n", 100 + day * 10))
            .collect();
        let path = write_csv(dir.path(), &body);
        let cfg = PipelineConfig {
            horizon_days: 14,
            ..config(dir.path())
        };
        let out = run(&path, "weeks", &cfg).unwrap();

        let boundary = chrono::NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let in_week: Vec<f64> = out
            .forecast
            .points
            .iter()
            .filter(|p| aggregate::week_start(p.date) == boundary)
            .map(|p| p.point_estimate)
            .collect();
        assert_eq!(in_week.len(), 7);
        let expected = in_week.iter().sum::<f64>() / 7.0;

        let week = out
            .report
            .weekly_forecast
            .iter()
            .find(|w| w.week_start == boundary)
            .unwrap();
        assert!((week.average_estimate - expected).abs() < 1e-9);
        assert_eq!(out.report.weekly_forecast.len(), 4);
    }

    #[test]
    fn single_day_fails_in_forecast_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "01/01,$10.00,0,0,10,0,10\n01/01,5,0,0,5,0,5\n");
        let err = run(&path, "bob", &config(dir.path())).unwrap_err();
        assert_eq!(err.stage, Stage::Forecast);
        assert!(matches!(err.source, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn header_only_fails_in_forecast_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "");
        let result = process(&path, "carol", &config(dir.path()));
        assert!(!result.success);
        assert_eq!(result.stage, Some(Stage::Forecast));
        assert!(result.report.is_none());
    }

    #[test]
    fn bad_namespace_fails_in_charts_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), &three_weeks());
        let err = run(&path, "../..", &config(dir.path())).unwrap_err();
        assert_eq!(err.stage, Stage::Charts);
        assert!(matches!(err.source, PipelineError::InvalidArgument(_)));
    }

    #[test]
    fn summary_skips_forecast() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "01/01,10,0,0,10,0,10\n");
        let out = run_summary(&path, 2024).unwrap();
        assert_eq!(out.daily.len(), 1);
        assert_eq!(out.statistics.day_count, 1);
        assert!(!dir.path().join("graphs").exists());
    }
}
