//! Trend changepoint placement.
//!
//! Potential changepoints are placed on observed times, evenly spaced (by index)
//! over the first `changepoint_range` fraction of the history. The first
//! observation is never a changepoint.
//!
//! When the history is short the count is reduced so that every changepoint
//! sits on a distinct observation inside the allowed range.

/// Choose changepoint locations from sorted scaled times `ts`.
pub fn changepoint_grid(ts: &[f64], n_changepoints: usize, changepoint_range: f64) -> Vec<f64> {
    if ts.is_empty() || n_changepoints == 0 {
        return Vec::new();
    }

    let range = changepoint_range.clamp(0.0, 1.0);
    let hist_size = (ts.len() as f64 * range).floor() as usize;
    if hist_size < 2 {
        return Vec::new();
    }

    let count = n_changepoints.min(hist_size - 1);
    let last_idx = (hist_size - 1) as f64;

    let mut out = Vec::with_capacity(count);
    for i in 1..=count {
        let idx = (i as f64 * last_idx / count as f64).round() as usize;
        let t = ts[idx];
        // Rounding can map two steps onto one index for small histories.
        if out.last().is_none_or(|prev| t > *prev) {
            out.push(t);
        }
    }
    out
}
