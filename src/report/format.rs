//! Plain-text rendering of pipeline outputs for the terminal.

use crate::domain::{DailyTotal, ForecastPoint, SalesReport, Statistics, WeeklyForecast, WeeklyTotal};

/// Number of trailing daily/weekly rows shown in summaries.
pub const SUMMARY_TAIL_ROWS: usize = 10;

/// Format the full report of a successful run.
pub fn format_report(report: &SalesReport) -> String {
    let mut out = String::new();

    out.push_str("=== sales - Sales Summary & Forecast ===\n");
    out.push_str(&format_statistics(&report.statistics));
    out.push('\n');
    out.push_str(&format_summary_tables(&report.daily, &report.weekly));
    out.push('\n');

    out.push_str(&format!(
        "Future daily sales predictions ({} days):\n",
        report.forecast_tail.len()
    ));
    out.push_str(&format_forecast_table(&report.forecast_tail));
    out.push('\n');

    out.push_str("Future weekly sales predictions (averages):\n");
    out.push_str(&format_weekly_forecast(&report.weekly_forecast));

    if !report.chart_paths.is_empty() {
        out.push_str("\nCharts:\n");
        for (name, path) in &report.chart_paths {
            out.push_str(&format!("- {name:<14} {path}\n"));
        }
    }

    out
}

/// Format the statistics block.
pub fn format_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    out.push_str(&format!("Days: {}\n", stats.day_count));
    out.push_str(&format!("Total sales:   {}\n", fmt_money(stats.total)));
    out.push_str(&format!("Average/day:   {}\n", fmt_money(stats.average)));
    out.push_str(&format!("Best day:      {}\n", fmt_money(stats.maximum)));
    out.push_str(&format!("Worst day:     {}\n", fmt_money(stats.minimum)));
    out
}

/// Format the last rows of the daily and weekly summaries.
pub fn format_summary_tables(daily: &[DailyTotal], weekly: &[WeeklyTotal]) -> String {
    let mut out = String::new();

    out.push_str("Daily sales summary:\n");
    out.push_str(&table_header(&["date", "total"]));
    for d in tail(daily, SUMMARY_TAIL_ROWS) {
        out.push_str(format!("{:<12} {:>14}", d.date, fmt_money(d.total)).trim_end());
        out.push('\n');
    }

    out.push_str("\nWeekly sales summary:\n");
    out.push_str(&table_header(&["week", "total"]));
    for w in tail(weekly, SUMMARY_TAIL_ROWS) {
        out.push_str(format!("{:<12} {:>14}", w.week_start, fmt_money(w.total)).trim_end());
        out.push('\n');
    }

    out
}

/// Format forecast points with their interval.
pub fn format_forecast_table(points: &[ForecastPoint]) -> String {
    let mut out = String::new();
    out.push_str(
        format!("{:<12} {:>14} {:>14} {:>14}", "date", "estimate", "lower", "upper").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<14} {:-<14} {:-<14}", "", "", "", "").trim_end());
    out.push('\n');

    for p in points {
        out.push_str(
            format!(
                "{:<12} {:>14} {:>14} {:>14}",
                p.date,
                fmt_money(p.point_estimate),
                fmt_money(p.lower_bound),
                fmt_money(p.upper_bound),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format weekly forecast averages.
pub fn format_weekly_forecast(weeks: &[WeeklyForecast]) -> String {
    let mut out = String::new();
    out.push_str(&table_header(&["week", "avg/day"]));
    for w in weeks {
        out.push_str(format!("{:<12} {:>14}", w.week_start, fmt_money(w.average_estimate)).trim_end());
        out.push('\n');
    }
    out
}

fn table_header(labels: &[&str; 2]) -> String {
    format!(
        "{:<12} {:>14}\n{:-<12} {:-<14}\n",
        labels[0], labels[1], "", ""
    )
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Format an amount as `$1,234.56` (negative as `-$1,234.56`).
pub fn fmt_money(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let cents = (v.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}
