//! Low-level fitting routine for the seasonal-trend model.
//!
//! Given a daily series `(date_i, y_i)` we:
//! - scale time to `[0, 1]` over the history and `y` by its max absolute value
//! - place trend changepoints on the observed times
//! - build the design matrix (trend + ramps + Fourier seasonalities)
//! - solve one L2-regularized least squares problem for all coefficients
//! - estimate the residual scale used for uncertainty intervals
//!
//! The penalties mirror Gaussian priors on the coefficients: a coefficient with
//! prior scale `s` receives ridge weight `1 / s²`.

use chrono::{Duration, NaiveDate};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::domain::{DailyTotal, ForecastPoint, ModelConfig};
use crate::error::PipelineError;
use crate::fit::changepoints::changepoint_grid;
use crate::math::{normal_quantile, solve_regularized};
use crate::models::{ColumnKind, DesignLayout, fill_design_row, predict};

/// Minimum number of distinct days needed to identify a trend.
pub const MIN_HISTORY_DAYS: usize = 2;

/// Prior scale on the base trend slope (scaled units).
const SLOPE_PRIOR_SCALE: f64 = 5.0;

/// A fitted seasonal-trend model.
#[derive(Debug, Clone)]
pub struct SeasonalFit {
    pub layout: DesignLayout,
    pub betas: Vec<f64>,
    /// First observed date (`t = 0`).
    pub start: NaiveDate,
    /// Days between first and last observation (`t = 1`).
    pub span_days: f64,
    /// Observed dates, ascending.
    pub history: Vec<NaiveDate>,
    /// Divisor applied to `y` before fitting.
    pub y_scale: f64,
    /// Residual standard deviation on the scaled data.
    pub sigma: f64,
    /// Normal quantile for the configured interval width.
    pub z: f64,
    /// Root mean squared error in original units.
    pub rmse: f64,
}

impl SeasonalFit {
    fn axes(&self, date: NaiveDate) -> (f64, f64) {
        let t_days = (date - self.start).num_days() as f64;
        (t_days / self.span_days, t_days)
    }

    /// Point estimate (original units) for `date`.
    pub fn estimate(&self, date: NaiveDate) -> f64 {
        let (t, t_days) = self.axes(date);
        predict(&self.layout, &self.betas, t, t_days) * self.y_scale
    }
}

/// Fit the model to a strictly increasing daily series.
pub fn fit_seasonal(daily: &[DailyTotal], config: &ModelConfig) -> Result<SeasonalFit, PipelineError> {
    validate_config(config)?;

    if daily.len() < MIN_HISTORY_DAYS {
        return Err(PipelineError::InsufficientData(format!(
            "forecasting needs at least {MIN_HISTORY_DAYS} days of history, got {}",
            daily.len()
        )));
    }
    if !daily.windows(2).all(|w| w[0].date < w[1].date) {
        return Err(PipelineError::InvalidArgument(
            "daily totals must be strictly increasing by date".to_string(),
        ));
    }
    if let Some(bad) = daily.iter().find(|d| !d.total.is_finite()) {
        return Err(PipelineError::InvalidArgument(format!(
            "non-finite daily total on {}",
            bad.date
        )));
    }

    let start = daily[0].date;
    let span_days = (daily[daily.len() - 1].date - start).num_days() as f64;
    let t_days: Vec<f64> = daily.iter().map(|d| (d.date - start).num_days() as f64).collect();
    let ts: Vec<f64> = t_days.iter().map(|t| t / span_days).collect();

    let max_abs = daily.iter().map(|d| d.total.abs()).fold(0.0, f64::max);
    let y_scale = if max_abs > 0.0 { max_abs } else { 1.0 };
    let y = DVector::from_iterator(daily.len(), daily.iter().map(|d| d.total / y_scale));

    let changepoints = changepoint_grid(&ts, config.n_changepoints, config.changepoint_range);
    let layout = DesignLayout::new(changepoints, config.seasonalities());
    let p = layout.width();
    let n = daily.len();

    let mut x = DMatrix::<f64>::zeros(n, p);
    let mut row = vec![0.0; p];
    for i in 0..n {
        fill_design_row(&layout, ts[i], t_days[i], &mut row);
        for (j, v) in row.iter().enumerate() {
            x[(i, j)] = *v;
        }
    }

    let penalties = column_penalties(&layout, config);
    let betas = solve_regularized(&x, &y, &penalties)
        .ok_or_else(|| PipelineError::ModelFit("least squares solve did not converge".to_string()))?;

    let fitted = &x * &betas;
    let sse: f64 = (&y - &fitted).iter().map(|r| r * r).sum();
    let sigma = (sse / n as f64).sqrt();
    if !sigma.is_finite() {
        return Err(PipelineError::ModelFit("non-finite residual scale".to_string()));
    }

    let z = normal_quantile(0.5 + config.interval_width / 2.0).ok_or_else(|| {
        PipelineError::InvalidArgument(format!("interval width {} is out of range", config.interval_width))
    })?;

    debug!(
        n,
        params = p,
        changepoints = layout.changepoints.len(),
        sigma,
        "seasonal-trend model fitted"
    );

    Ok(SeasonalFit {
        layout,
        betas: betas.iter().copied().collect(),
        start,
        span_days,
        history: daily.iter().map(|d| d.date).collect(),
        y_scale,
        sigma,
        z,
        rmse: sigma * y_scale,
    })
}

/// Produce fitted values over the history followed by `horizon_days` future days.
pub fn forecast_points(fit: &SeasonalFit, horizon_days: i64) -> Result<Vec<ForecastPoint>, PipelineError> {
    let horizon = validate_horizon(horizon_days)?;
    let n = fit.history.len();
    let Some(&last) = fit.history.last() else {
        return Err(PipelineError::InsufficientData("model has no history".to_string()));
    };

    // Reject horizons running past the calendar before allocating anything.
    Duration::try_days(horizon_days)
        .and_then(|d| last.checked_add_signed(d))
        .ok_or_else(|| {
            PipelineError::InvalidArgument(format!("horizon of {horizon_days} days overflows the calendar"))
        })?;

    let mut out = Vec::with_capacity(n + horizon);
    let band = fit.z * fit.sigma * fit.y_scale;
    for &date in &fit.history {
        out.push(make_point(fit, date, band)?);
    }

    for h in 1..=horizon_days {
        let date = last + Duration::days(h);
        let widen = (1.0 + h as f64 / n as f64).sqrt();
        out.push(make_point(fit, date, band * widen)?);
    }

    Ok(out)
}

/// Check a forecast horizon and convert it to a length.
pub fn validate_horizon(horizon_days: i64) -> Result<usize, PipelineError> {
    if horizon_days <= 0 {
        return Err(PipelineError::InvalidArgument(format!(
            "forecast horizon must be a positive number of days, got {horizon_days}"
        )));
    }
    usize::try_from(horizon_days)
        .map_err(|_| PipelineError::InvalidArgument(format!("forecast horizon {horizon_days} is too large")))
}

fn make_point(fit: &SeasonalFit, date: NaiveDate, half_width: f64) -> Result<ForecastPoint, PipelineError> {
    let point_estimate = fit.estimate(date);
    if !point_estimate.is_finite() || !half_width.is_finite() {
        return Err(PipelineError::ModelFit(format!("non-finite prediction for {date}")));
    }
    Ok(ForecastPoint {
        date,
        point_estimate,
        lower_bound: point_estimate - half_width,
        upper_bound: point_estimate + half_width,
    })
}

fn column_penalties(layout: &DesignLayout, config: &ModelConfig) -> Vec<f64> {
    let ridge = |scale: f64| 1.0 / (scale * scale);
    layout
        .column_kinds()
        .into_iter()
        .map(|kind| match kind {
            ColumnKind::Intercept => 0.0,
            ColumnKind::Slope => ridge(SLOPE_PRIOR_SCALE),
            ColumnKind::Changepoint => ridge(config.changepoint_prior_scale),
            ColumnKind::Seasonal => ridge(config.seasonality_prior_scale),
        })
        .collect()
}

fn validate_config(config: &ModelConfig) -> Result<(), PipelineError> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(config.changepoint_prior_scale) || !positive(config.seasonality_prior_scale) {
        return Err(PipelineError::InvalidArgument(
            "prior scales must be finite and > 0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.changepoint_range) {
        return Err(PipelineError::InvalidArgument(format!(
            "changepoint range {} must be within [0, 1]",
            config.changepoint_range
        )));
    }
    if !(config.interval_width > 0.0 && config.interval_width < 1.0) {
        return Err(PipelineError::InvalidArgument(format!(
            "interval width {} must be within (0, 1)",
            config.interval_width
        )));
    }
    Ok(())
}
