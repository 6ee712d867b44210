//! ASCII plotting of daily sales for terminal output.
//!
//! Fixed-size grid with deterministic output, for quick sanity checks:
//! - observed daily totals: `o`
//! - forecast point estimates: `-` line
//! - forecast interval edges: `:`

use chrono::NaiveDate;

use crate::domain::{DailyTotal, Forecast, ForecastPoint};

/// Render daily totals, optionally overlaid with a forecast.
pub fn render_ascii_plot(daily: &[DailyTotal], forecast: Option<&Forecast>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some(origin) = first_date(daily, forecast) else {
        return "Plot: no data\n".to_string();
    };
    let observed: Vec<(f64, f64)> = daily.iter().map(|d| (day_offset(origin, d.date), d.total)).collect();
    let (estimate, lower, upper) = forecast
        .map(|f| {
            let series = |pick: fn(&ForecastPoint) -> f64| -> Vec<(f64, f64)> {
                f.points.iter().map(|p| (day_offset(origin, p.date), pick(p))).collect()
            };
            (
                series(|p| p.point_estimate),
                series(|p| p.lower_bound),
                series(|p| p.upper_bound),
            )
        })
        .unwrap_or_default();

    let all = || observed.iter().chain(&estimate).chain(&lower).chain(&upper);
    let (x_min, x_max) = range(all().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(all().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let to_cell = |&(x, y): &(f64, f64)| {
        (
            map_x(x, x_min, x_max, width),
            map_y(y, y_min, y_max, height),
        )
    };

    // Estimate line first so band edges and points overlay it.
    let mut prev = None;
    for cell in estimate.iter().map(to_cell) {
        match prev {
            Some((x0, y0)) => draw_line(&mut grid, x0, y0, cell.0, cell.1, '-'),
            None => grid[cell.1][cell.0] = '-',
        }
        prev = Some(cell);
    }
    for (x, y) in lower.iter().chain(&upper).map(to_cell) {
        grid[y][x] = ':';
    }
    for (x, y) in observed.iter().map(to_cell) {
        grid[y][x] = 'o';
    }

    let last = origin + chrono::Duration::days(x_max.round() as i64);
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: date=[{origin}, {last}] | sales=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn first_date(daily: &[DailyTotal], forecast: Option<&Forecast>) -> Option<NaiveDate> {
    let observed = daily.iter().map(|d| d.date);
    let predicted = forecast.into_iter().flat_map(|f| f.points.iter().map(|p| p.date));
    observed.chain(predicted).min()
}

fn day_offset(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else if min.is_finite() && max.is_finite() {
        Some((min - 0.5, max + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // top row is max
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
