//! Reporting utilities: summary statistics and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

pub mod format;

pub use format::*;

use crate::domain::{DailyTotal, Statistics};
use crate::error::PipelineError;

/// Sum, mean, max, min, and day count over daily totals.
///
/// An empty series has no mean/max/min, so it is an error rather than NaN.
pub fn summarize(daily: &[DailyTotal]) -> Result<Statistics, PipelineError> {
    if daily.is_empty() {
        return Err(PipelineError::InsufficientData(
            "statistics need at least one day of sales".to_string(),
        ));
    }

    let mut total = 0.0;
    let mut maximum = f64::NEG_INFINITY;
    let mut minimum = f64::INFINITY;
    for d in daily {
        total += d.total;
        maximum = maximum.max(d.total);
        minimum = minimum.min(d.total);
    }

    Ok(Statistics {
        total,
        average: total / daily.len() as f64,
        maximum,
        minimum,
        day_count: daily.len(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn two_day_statistics() {
        let daily = vec![
            DailyTotal {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                total: 17.6,
            },
            DailyTotal {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                total: 27.5,
            },
        ];
        let stats = summarize(&daily).unwrap();
        assert!((stats.total - 45.1).abs() < 1e-9);
        assert!((stats.average - 22.55).abs() < 1e-9);
        assert!((stats.maximum - 27.5).abs() < 1e-12);
        assert!((stats.minimum - 17.6).abs() < 1e-12);
        assert_eq!(stats.day_count, 2);
    }

    #[test]
    fn empty_series_is_insufficient_data() {
        assert!(matches!(summarize(&[]), Err(PipelineError::InsufficientData(_))));
    }
}
