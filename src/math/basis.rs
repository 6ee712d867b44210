//! Basis functions for the additive seasonal-trend model.
//!
//! - Fourier terms model a periodic component:
//!   `s(t) = Σ_k a_k cos(2πkt/P) + b_k sin(2πkt/P)` for `k = 1..=order`
//! - Changepoint ramps model slope changes in a piecewise-linear trend:
//!   `r(t, c) = max(t - c, 0)`
//!
//! Numerical notes:
//! - Fourier terms are evaluated on `t` in **days** so the period is exact.
//! - Ramps are evaluated on `t` scaled to `[0, 1]` over the history so trend
//!   coefficients are comparable regardless of history length.

use std::f64::consts::TAU;

/// Fill `out` with `[cos(2π·1·t/P), sin(2π·1·t/P), …, cos(2π·N·t/P), sin(2π·N·t/P)]`.
///
/// # Panics
/// Panics if `out.len() != 2 * order`.
pub fn fill_fourier_terms(t_days: f64, period_days: f64, order: usize, out: &mut [f64]) {
    assert_eq!(out.len(), 2 * order, "fourier output slice has wrong length");
    for k in 0..order {
        let x = TAU * (k + 1) as f64 * t_days / period_days;
        out[2 * k] = x.cos();
        out[2 * k + 1] = x.sin();
    }
}

/// Trend ramp for a changepoint at `c`.
pub fn changepoint_ramp(t: f64, c: f64) -> f64 {
    (t - c).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourier_terms_repeat_every_period() {
        let mut a = [0.0; 6];
        let mut b = [0.0; 6];
        fill_fourier_terms(2.0, 7.0, 3, &mut a);
        fill_fourier_terms(9.0, 7.0, 3, &mut b);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn daily_fourier_terms_are_constant_on_whole_days() {
        let mut out = [0.0; 8];
        for day in 0..10 {
            fill_fourier_terms(day as f64, 1.0, 4, &mut out);
            for k in 0..4 {
                assert!((out[2 * k] - 1.0).abs() < 1e-9);
                assert!(out[2 * k + 1].abs() < 1e-9);
            }
        }
    }

    #[test]
    fn ramp_is_zero_before_changepoint() {
        assert_eq!(changepoint_ramp(0.2, 0.5), 0.0);
        assert!((changepoint_ramp(0.75, 0.5) - 0.25).abs() < 1e-12);
    }
}
