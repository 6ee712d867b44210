use std::fs;
use std::path::{Path, PathBuf};

use sales_forecast::app::pipeline::{process, run};
use sales_forecast::domain::{PipelineConfig, Stage};
use sales_forecast::error::PipelineError;
use sales_forecast::io::export::write_result_json;

const HEADER: &str = ",Food,Drink,Modifier,Gross,Tax,Total";

fn write_csv(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("sales.csv");
    fs::write(&path, contents).unwrap();
    path
}

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        charts_root: dir.join("graphs"),
        ..PipelineConfig::default()
    }
}

/// Four weeks of January sales with a weekend bump; amounts are quoted
/// currency strings as exported by the POS system.
fn january_csv() -> String {
    let mut out = format!("{HEADER}\n");
    for day in 1..=28u32 {
        let weekend = matches!(day % 7, 6 | 0);
        let total = if weekend { 1450.0 } else { 980.0 } + day as f64 * 3.0;
        let food = total * 0.6;
        let drink = total * 0.3;
        out.push_str(&format!(
            "01/{day:02},\"${food:.2}\",\"${drink:.2}\",$0.00,\"${:.2}\",\"${:.2}\",\"${total:.2}\"\n",
            food + drink,
            total - food - drink,
        ));
    }
    out
}

#[test]
fn full_run_produces_report_charts_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &january_csv());

    let result = process(&path, "Alice Smith", &config(dir.path()));
    assert!(result.success, "{:?}", result.error);
    let report = result.report.as_ref().unwrap();

    assert_eq!(report.daily.len(), 28);
    assert_eq!(report.weekly.len(), 4);
    assert_eq!(report.forecast_tail.len(), 30);
    assert_eq!(report.statistics.day_count, 28);
    assert_eq!(
        report.forecast_tail.first().map(|p| p.date.to_string()),
        Some("2024-01-29".to_string())
    );
    for p in &report.forecast_tail {
        assert!(p.lower_bound <= p.point_estimate && p.point_estimate <= p.upper_bound);
    }

    let names: Vec<&str> = report.chart_paths.keys().map(String::as_str).collect();
    assert_eq!(names, ["daily_sales", "distribution", "forecast", "weekly_sales"]);
    for rel in report.chart_paths.values() {
        assert!(rel.starts_with("Alice_Smith/"), "{rel}");
        assert!(dir.path().join("graphs").join(rel).is_file(), "{rel}");
    }

    let json_path = dir.path().join("result.json");
    write_result_json(&json_path, &result).unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(value["success"], true);
    for key in ["daily", "weekly", "forecast_tail", "weekly_forecast", "chart_paths", "statistics"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    assert!(value.get("stage").is_none());
}

#[test]
fn scenario_totals_and_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let csv = format!(
        "{HEADER}\n\
         01/01,$10.00,$5.00,$1.00,$16.00,$1.60,$17.60\n\
         01/02,$15.00,$8.00,$2.00,$25.00,$2.50,$27.50\n"
    );
    let path = write_csv(dir.path(), &csv);

    let out = run(&path, "scenario", &config(dir.path())).unwrap();
    let totals: Vec<(String, f64)> = out
        .report
        .daily
        .iter()
        .map(|d| (d.date.to_string(), d.total))
        .collect();
    assert_eq!(
        totals,
        [("2024-01-01".to_string(), 17.6), ("2024-01-02".to_string(), 27.5)]
    );

    let stats = out.report.statistics;
    assert!((stats.total - 45.1).abs() < 1e-9);
    assert!((stats.average - 22.55).abs() < 1e-9);
    assert_eq!(stats.maximum, 27.5);
    assert_eq!(stats.minimum, 17.6);
    assert_eq!(stats.day_count, 2);
}

#[test]
fn missing_total_column_fails_at_ingest() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), ",Food,Drink,Modifier,Gross,Tax\n01/01,1,1,1,1,1\n");

    let err = run(&path, "x", &config(dir.path())).unwrap_err();
    assert_eq!(err.stage, Stage::Ingest);
    assert!(matches!(&err.source, PipelineError::Schema { column } if column == "Total"));

    let result = process(&path, "x", &config(dir.path()));
    assert!(!result.success);
    assert!(result.report.is_none());
    assert!(result.error.unwrap().contains("Total"));
    assert!(!dir.path().join("graphs").exists());
}

#[test]
fn non_numeric_amount_names_column_and_value() {
    let dir = tempfile::tempdir().unwrap();
    let csv = format!("{HEADER}\n01/01,$10.00,N/A,$1.00,$16.00,$1.60,$17.60\n");
    let path = write_csv(dir.path(), &csv);

    let err = run(&path, "x", &config(dir.path())).unwrap_err();
    assert_eq!(err.stage, Stage::Ingest);
    match err.source {
        PipelineError::DataFormat { column, value, line, .. } => {
            assert_eq!(column, "Drink");
            assert_eq!(value, "N/A");
            assert_eq!(line, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn header_only_csv_is_insufficient_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &format!("{HEADER}\n"));

    let result = process(&path, "x", &config(dir.path()));
    assert!(!result.success);
    assert_eq!(result.stage, Some(Stage::Forecast));
    assert!(result.error.unwrap().contains("insufficient data"));
}

#[test]
fn non_positive_horizon_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &january_csv());
    for horizon_days in [0, -7] {
        let config = PipelineConfig {
            horizon_days,
            ..config(dir.path())
        };
        let err = run(&path, "x", &config).unwrap_err();
        assert_eq!(err.stage, Stage::Forecast);
        assert!(matches!(err.source, PipelineError::InvalidArgument(_)));
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&dir.path().join("nope.csv"), "x", &config(dir.path())).unwrap_err();
    assert_eq!(err.stage, Stage::Ingest);
    assert!(matches!(err.source, PipelineError::Io { .. }));
    assert_eq!(err.source.exit_code(), 2);
}

#[test]
fn namespaces_do_not_share_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), &january_csv());
    let config = config(dir.path());

    let a = run(&path, "alice", &config).unwrap();
    let b = run(&path, "bob", &config).unwrap();
    assert_ne!(a.report.chart_paths["forecast"], b.report.chart_paths["forecast"]);
    assert!(dir.path().join("graphs/alice/forecast.svg").is_file());
    assert!(dir.path().join("graphs/bob/forecast.svg").is_file());
}
