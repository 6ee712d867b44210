//! Design-matrix layout and evaluation for the seasonal-trend model.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given time (for least squares)
//! - predict y(t) given coefficients (for fitted values and forecasts)
//!
//! Column order is fixed:
//!
//! ```text
//! [ intercept | slope | changepoint ramps … | seasonality blocks … ]
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::Seasonality;
use crate::math::{changepoint_ramp, fill_fourier_terms};

/// Which kind of coefficient a design column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Intercept,
    Slope,
    Changepoint,
    Seasonal,
}

/// Column layout of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignLayout {
    /// Changepoint locations on the scaled time axis (`0..=1` over history).
    pub changepoints: Vec<f64>,
    pub seasonalities: Vec<Seasonality>,
}

impl DesignLayout {
    pub fn new(changepoints: Vec<f64>, seasonalities: Vec<Seasonality>) -> Self {
        Self {
            changepoints,
            seasonalities,
        }
    }

    /// Number of coefficients.
    pub fn width(&self) -> usize {
        2 + self.changepoints.len() + self.seasonal_width()
    }

    fn seasonal_width(&self) -> usize {
        self.seasonalities.iter().map(|s| 2 * s.fourier_order).sum()
    }

    /// Kind of each column, in column order.
    pub fn column_kinds(&self) -> Vec<ColumnKind> {
        let mut kinds = vec![ColumnKind::Intercept, ColumnKind::Slope];
        kinds.extend(std::iter::repeat_n(ColumnKind::Changepoint, self.changepoints.len()));
        kinds.extend(std::iter::repeat_n(ColumnKind::Seasonal, self.seasonal_width()));
        kinds
    }
}

/// Fill a design row for scaled time `t` (trend axis) and `t_days` (seasonal axis).
///
/// # Panics
/// Panics if `out` does not have length `layout.width()`.
pub fn fill_design_row(layout: &DesignLayout, t: f64, t_days: f64, out: &mut [f64]) {
    assert_eq!(out.len(), layout.width(), "design row has wrong length");

    out[0] = 1.0;
    out[1] = t;

    let mut col = 2;
    for &c in &layout.changepoints {
        out[col] = changepoint_ramp(t, c);
        col += 1;
    }

    for s in &layout.seasonalities {
        let width = 2 * s.fourier_order;
        fill_fourier_terms(t_days, s.period_days, s.fourier_order, &mut out[col..col + width]);
        col += width;
    }
}

/// Predict `y(t)` for the given layout and coefficients.
pub fn predict(layout: &DesignLayout, betas: &[f64], t: f64, t_days: f64) -> f64 {
    let mut row = vec![0.0; layout.width()];
    fill_design_row(layout, t, t_days, &mut row);
    row.iter().zip(betas).map(|(x, b)| x * b).sum()
}
