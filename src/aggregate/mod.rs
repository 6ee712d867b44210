//! Daily and weekly sales aggregation.
//!
//! Both reductions are pure: they sum `total` per key and return keys in
//! ascending order. Weeks start on Monday.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::{DailyTotal, ForecastPoint, SalesRecord, WeeklyForecast, WeeklyTotal};

/// Sum totals per calendar day.
pub fn daily(records: &[SalesRecord]) -> Vec<DailyTotal> {
    group_sum(records.iter().map(|r| (r.date, r.total)))
        .into_iter()
        .map(|(date, total)| DailyTotal { date, total })
        .collect()
}

/// Sum totals per Monday-based week.
pub fn weekly(records: &[SalesRecord]) -> Vec<WeeklyTotal> {
    group_sum(records.iter().map(|r| (week_start(r.date), r.total)))
        .into_iter()
        .map(|(week_start, total)| WeeklyTotal { week_start, total })
        .collect()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Average point estimate per week, keeping the last `last_n` weeks.
pub fn weekly_forecast(points: &[ForecastPoint], last_n: usize) -> Vec<WeeklyForecast> {
    let mut weeks: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for p in points {
        let slot = weeks.entry(week_start(p.date)).or_insert((0.0, 0));
        slot.0 += p.point_estimate;
        slot.1 += 1;
    }

    let all: Vec<WeeklyForecast> = weeks
        .into_iter()
        .map(|(week_start, (sum, n))| WeeklyForecast {
            week_start,
            average_estimate: sum / n as f64,
        })
        .collect();

    let skip = all.len().saturating_sub(last_n);
    all.into_iter().skip(skip).collect()
}

fn group_sum(items: impl Iterator<Item = (NaiveDate, f64)>) -> BTreeMap<NaiveDate, f64> {
    let mut out = BTreeMap::new();
    for (key, value) in items {
        *out.entry(key).or_insert(0.0) += value;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn record(date: NaiveDate, total: f64) -> SalesRecord {
        SalesRecord {
            date,
            food: 0.0,
            drink: 0.0,
            modifier: 0.0,
            gross: total,
            tax: 0.0,
            total,
        }
    }

    #[test]
    fn daily_merges_duplicates_and_sorts() {
        let records = vec![
            record(d(1, 3), 5.0),
            record(d(1, 1), 17.6),
            record(d(1, 3), 2.5),
            record(d(1, 2), 27.5),
        ];
        let out = daily(&records);
        let dates: Vec<NaiveDate> = out.iter().map(|x| x.date).collect();
        assert_eq!(dates, vec![d(1, 1), d(1, 2), d(1, 3)]);
        assert!((out[2].total - 7.5).abs() < 1e-12);
    }

    #[test]
    fn weekly_groups_by_monday() {
        // 2024-01-01 is a Monday; 01-07 is the Sunday of the same week.
        let records = vec![
            record(d(1, 8), 4.0),
            record(d(1, 1), 1.0),
            record(d(1, 7), 2.0),
            record(d(1, 14), 8.0),
        ];
        let out = weekly(&records);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], WeeklyTotal { week_start: d(1, 1), total: 3.0 });
        assert_eq!(out[1], WeeklyTotal { week_start: d(1, 8), total: 12.0 });
    }

    #[test]
    fn week_start_handles_month_boundaries() {
        // 2024-03-01 is a Friday.
        assert_eq!(week_start(d(3, 1)), d(2, 26));
        assert_eq!(week_start(d(2, 26)), d(2, 26));
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(daily(&[]).is_empty());
        assert!(weekly(&[]).is_empty());
        assert!(weekly_forecast(&[], 5).is_empty());
    }

    #[test]
    fn weekly_forecast_averages_and_keeps_tail() {
        let points: Vec<ForecastPoint> = (1..=21)
            .map(|day| ForecastPoint {
                date: d(1, day),
                point_estimate: day as f64,
                lower_bound: 0.0,
                upper_bound: 0.0,
            })
            .collect();
        let out = weekly_forecast(&points, 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].week_start, d(1, 8));
        assert!((out[0].average_estimate - 11.0).abs() < 1e-12);
        assert!((out[1].average_estimate - 18.0).abs() < 1e-12);
    }
}
