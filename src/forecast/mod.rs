//! Forecasting capability used by the pipeline.
//!
//! The pipeline only depends on `ForecastBackend`, so a different statistical
//! or machine-learning model can be substituted without touching the
//! orchestration code. `SeasonalTrendModel` is the built-in backend.

use std::time::Instant;

use tracing::info;

use crate::domain::{DailyTotal, Forecast, ForecastPoint, ModelConfig};
use crate::error::PipelineError;
use crate::fit::{SeasonalFit, fit_seasonal, forecast_points, validate_horizon};

/// Fit a model on daily totals and predict a horizon of future days.
pub trait ForecastBackend: Sync {
    /// Fitted model state.
    type Handle: Send;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fit on daily totals (ascending, one entry per date).
    fn fit(&self, daily: &[DailyTotal]) -> Result<Self::Handle, PipelineError>;

    /// Fitted values for every historical date followed by exactly
    /// `horizon_days` future days, each with a two-sided interval.
    fn predict(&self, handle: &Self::Handle, horizon_days: i64) -> Result<Vec<ForecastPoint>, PipelineError>;
}

/// Additive trend + Fourier seasonality model, fitted by regularized least squares.
#[derive(Debug, Clone, Default)]
pub struct SeasonalTrendModel {
    pub config: ModelConfig,
}

impl SeasonalTrendModel {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }
}

impl ForecastBackend for SeasonalTrendModel {
    type Handle = SeasonalFit;

    fn name(&self) -> &'static str {
        "seasonal-trend"
    }

    fn fit(&self, daily: &[DailyTotal]) -> Result<SeasonalFit, PipelineError> {
        fit_seasonal(daily, &self.config)
    }

    fn predict(&self, handle: &SeasonalFit, horizon_days: i64) -> Result<Vec<ForecastPoint>, PipelineError> {
        forecast_points(handle, horizon_days)
    }
}

/// Fit `backend` and forecast `horizon_days` past the last observed date.
///
/// The horizon is validated before fitting so a bad argument never pays for a fit.
pub fn run_forecast<B: ForecastBackend>(
    backend: &B,
    daily: &[DailyTotal],
    horizon_days: i64,
) -> Result<Forecast, PipelineError> {
    let horizon = validate_horizon(horizon_days)?;

    let started = Instant::now();
    let handle = backend.fit(daily)?;
    let points = backend.predict(&handle, horizon_days)?;
    if points.len() != daily.len() + horizon {
        return Err(PipelineError::ModelFit(format!(
            "backend `{}` returned {} points, expected {}",
            backend.name(),
            points.len(),
            daily.len() + horizon
        )));
    }

    info!(
        backend = backend.name(),
        history_days = daily.len(),
        horizon,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "forecast generated"
    );

    Ok(Forecast { points, horizon })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    /// Repeats the last observed value with a fixed band.
    struct NaiveLast;

    impl ForecastBackend for NaiveLast {
        type Handle = (Vec<DailyTotal>, f64);

        fn name(&self) -> &'static str {
            "naive-last"
        }

        fn fit(&self, daily: &[DailyTotal]) -> Result<Self::Handle, PipelineError> {
            let last = daily
                .last()
                .ok_or_else(|| PipelineError::InsufficientData("empty".to_string()))?;
            Ok((daily.to_vec(), last.total))
        }

        fn predict(&self, handle: &Self::Handle, horizon_days: i64) -> Result<Vec<ForecastPoint>, PipelineError> {
            let (history, level) = handle;
            let last = history[history.len() - 1].date;
            let future = (1..=horizon_days).map(|h| last + Duration::days(h));
            Ok(history
                .iter()
                .map(|d| d.date)
                .chain(future)
                .map(|date| ForecastPoint {
                    date,
                    point_estimate: *level,
                    lower_bound: level - 1.0,
                    upper_bound: level + 1.0,
                })
                .collect())
        }
    }

    fn daily(n: usize) -> Vec<DailyTotal> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| DailyTotal {
                date: start + Duration::days(i as i64),
                total: 10.0 + i as f64,
            })
            .collect()
    }

    #[test]
    fn alternative_backend_plugs_in() {
        let forecast = run_forecast(&NaiveLast, &daily(4), 3).unwrap();
        assert_eq!(forecast.points.len(), 7);
        assert_eq!(forecast.tail().len(), 3);
        assert!(forecast.tail().iter().all(|p| (p.point_estimate - 13.0).abs() < 1e-12));
    }

    #[test]
    fn output_length_is_history_plus_horizon() {
        let model = SeasonalTrendModel::default();
        let forecast = run_forecast(&model, &daily(14), 30).unwrap();
        assert_eq!(forecast.points.len(), 44);
        assert_eq!(forecast.horizon, 30);
        assert_eq!(forecast.history().len(), 14);
    }

    #[test]
    fn bad_horizon_fails_before_fit() {
        // One day would fail the fit; the horizon check must win.
        let err = run_forecast(&SeasonalTrendModel::default(), &daily(1), 0).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidArgument(_)));
    }

    #[test]
    fn insufficient_history() {
        let err = run_forecast(&SeasonalTrendModel::default(), &daily(1), 30).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }
}
