//! SVG chart files for a pipeline run.
//!
//! Each run writes up to four charts under `<root>/<namespace>/`:
//! - `daily_sales.svg`: daily totals, line + markers
//! - `weekly_sales.svg`: weekly totals, line + markers
//! - `forecast.svg`: fitted history, dashed future estimate, shaded interval band
//! - `distribution.svg`: histogram of daily totals
//!
//! Rendering is stateless: every call builds its own backend from an explicit path.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use tracing::{debug, info};

use crate::domain::{DailyTotal, Forecast, WeeklyTotal};
use crate::error::PipelineError;

pub const DAILY_CHART: &str = "daily_sales";
pub const WEEKLY_CHART: &str = "weekly_sales";
pub const FORECAST_CHART: &str = "forecast";
pub const DISTRIBUTION_CHART: &str = "distribution";

/// Histogram bin count for the distribution chart.
pub const HISTOGRAM_BINS: usize = 20;

type DrawResult = Result<(), Box<dyn Error>>;

/// Writes chart files below a fixed root directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    pub root: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ChartRenderer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            width: 1000,
            height: 600,
        }
    }

    /// Render all charts for one namespace.
    ///
    /// Returns chart name -> path relative to `root` (`<namespace>/<chart>.svg`).
    /// Without a forecast the `forecast` chart is skipped.
    pub fn render(
        &self,
        daily: &[DailyTotal],
        weekly: &[WeeklyTotal],
        forecast: Option<&Forecast>,
        namespace: &str,
    ) -> Result<BTreeMap<String, String>, PipelineError> {
        let namespace = sanitize_namespace(namespace)?;
        let dir = self.root.join(&namespace);
        fs::create_dir_all(&dir)
            .map_err(|e| PipelineError::Chart(format!("failed to create '{}': {e}", dir.display())))?;

        let mut paths = BTreeMap::new();
        let mut emit = |name: &str, draw: &dyn Fn(&Path) -> DrawResult| -> Result<(), PipelineError> {
            let file = dir.join(format!("{name}.svg"));
            draw(&file).map_err(|e| PipelineError::Chart(format!("{name}: {e}")))?;
            debug!(chart = name, path = %file.display(), "chart written");
            paths.insert(name.to_string(), format!("{namespace}/{name}.svg"));
            Ok(())
        };

        let size = (self.width, self.height);
        let daily_xy: Vec<(f64, f64)> = match daily.first() {
            Some(first) => daily.iter().map(|d| (day_offset(first.date, d.date), d.total)).collect(),
            None => Vec::new(),
        };
        let daily_origin = daily.first().map(|d| d.date);
        emit(DAILY_CHART, &|file| {
            draw_line_chart(file, size, "Daily Sales", &daily_xy, daily_origin, BLUE)
        })?;

        let weekly_origin = weekly.first().map(|w| w.week_start);
        let weekly_xy: Vec<(f64, f64)> = match weekly.first() {
            Some(first) => weekly
                .iter()
                .map(|w| (day_offset(first.week_start, w.week_start), w.total))
                .collect(),
            None => Vec::new(),
        };
        emit(WEEKLY_CHART, &|file| {
            draw_line_chart(file, size, "Weekly Sales", &weekly_xy, weekly_origin, GREEN)
        })?;

        if let Some(forecast) = forecast {
            emit(FORECAST_CHART, &|file| draw_forecast_chart(file, size, daily, forecast))?;
        }

        let totals: Vec<f64> = daily.iter().map(|d| d.total).collect();
        emit(DISTRIBUTION_CHART, &|file| draw_histogram(file, size, &totals))?;

        info!(namespace = %namespace, charts = paths.len(), "charts rendered");
        Ok(paths)
    }
}

/// Turn a caller-supplied namespace into a single safe path component.
///
/// Separators and whitespace runs become `_`; anything outside ASCII
/// alphanumerics, `_`, `-`, `.` is dropped; leading/trailing `.` and `_`
/// are trimmed.
pub fn sanitize_namespace(raw: &str) -> Result<String, PipelineError> {
    let spaced = raw.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidArgument(format!(
            "namespace '{raw}' has no usable characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn day_offset(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

fn date_label(origin: Option<NaiveDate>, offset: f64) -> String {
    match origin {
        Some(o) => (o + Duration::days(offset.round() as i64)).format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    if max <= min {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn x_bounds(xy: &[(f64, f64)]) -> (f64, f64) {
    match (xy.first(), xy.last()) {
        (Some(&(a, _)), Some(&(b, _))) if b > a => (a, b),
        (Some(&(a, _)), Some(_)) => (a - 1.0, a + 1.0),
        _ => (0.0, 1.0),
    }
}

fn draw_line_chart(
    file: &Path,
    size: (u32, u32),
    title: &str,
    xy: &[(f64, f64)],
    origin: Option<NaiveDate>,
    color: RGBColor,
) -> DrawResult {
    let root = SVGBackend::new(file, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (x0, x1) = x_bounds(xy);
    let (y0, y1) = bounds(xy.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Sales")
        .x_labels(6)
        .x_label_formatter(&|v| date_label(origin, *v))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    chart.draw_series(LineSeries::new(xy.iter().copied(), &color))?;
    chart.draw_series(xy.iter().map(|&p| Circle::new(p, 3, color.filled())))?;

    root.present()?;
    Ok(())
}

fn draw_forecast_chart(file: &Path, size: (u32, u32), daily: &[DailyTotal], forecast: &Forecast) -> DrawResult {
    let root = SVGBackend::new(file, size).into_drawing_area();
    root.fill(&WHITE)?;

    let origin = forecast
        .points
        .first()
        .map(|p| p.date)
        .or_else(|| daily.first().map(|d| d.date));
    let at = |date: NaiveDate| origin.map(|o| day_offset(o, date)).unwrap_or(0.0);

    let observed: Vec<(f64, f64)> = daily.iter().map(|d| (at(d.date), d.total)).collect();
    let fitted: Vec<(f64, f64)> = forecast.history().iter().map(|p| (at(p.date), p.point_estimate)).collect();
    let tail = forecast.tail();
    let mut future: Vec<(f64, f64)> = tail.iter().map(|p| (at(p.date), p.point_estimate)).collect();
    // Join the dashed future line onto the last fitted value.
    if let Some(&last) = fitted.last() {
        future.insert(0, last);
    }

    let mut band: Vec<(f64, f64)> = tail.iter().map(|p| (at(p.date), p.upper_bound)).collect();
    band.extend(tail.iter().rev().map(|p| (at(p.date), p.lower_bound)));

    let all_x: Vec<(f64, f64)> = forecast.points.iter().map(|p| (at(p.date), 0.0)).collect();
    let (x0, x1) = x_bounds(&all_x);
    let (y0, y1) = bounds(
        observed
            .iter()
            .map(|p| p.1)
            .chain(forecast.points.iter().flat_map(|p| [p.lower_bound, p.upper_bound])),
    );

    let mut chart = ChartBuilder::on(&root)
        .caption("Sales Forecast", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Sales")
        .x_labels(6)
        .x_label_formatter(&|v| date_label(origin, *v))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    let band_color = RGBColor(255, 165, 0);
    if band.len() >= 3 {
        chart.draw_series(std::iter::once(Polygon::new(band, band_color.mix(0.25).filled())))?;
    }
    chart.draw_series(observed.iter().map(|&p| Circle::new(p, 2, BLACK.filled())))?;
    chart.draw_series(LineSeries::new(fitted, &BLUE))?;
    chart.draw_series(DashedLineSeries::new(future, 6, 4, RED.stroke_width(2)))?;

    root.present()?;
    Ok(())
}

/// Equal-width bin counts over `[min, max]`; the last bin is closed.
pub fn histogram(values: &[f64], bins: usize) -> (f64, f64, Vec<usize>) {
    let bins = bins.max(1);
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.clone().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return (0.0, 1.0, vec![0; bins]);
    }
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0; bins];
    for v in finite {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    (lo, hi, counts)
}

fn draw_histogram(file: &Path, size: (u32, u32), totals: &[f64]) -> DrawResult {
    let root = SVGBackend::new(file, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (lo, hi, counts) = histogram(totals, HISTOGRAM_BINS);
    let width = (hi - lo) / counts.len() as f64;
    let peak = counts.iter().copied().max().unwrap_or(0).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of Daily Sales", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0.0..peak * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Daily sales")
        .y_desc("Days")
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    let bar = RGBColor(70, 130, 180);
    chart.draw_series(counts.iter().enumerate().filter(|(_, c)| **c > 0).map(|(i, &c)| {
        let x0 = lo + i as f64 * width;
        Rectangle::new([(x0, 0.0), (x0 + width, c as f64)], bar.mix(0.8).filled())
    }))?;

    root.present()?;
    Ok(())
}
