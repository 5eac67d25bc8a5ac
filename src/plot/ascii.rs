//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed monthly counts: `#` bars
//! - fitted curve: `-` line (drawn only into empty cells)

use crate::domain::RelativeMonthSeries;
use crate::report::PREDICTION_PADDING_MONTHS;

/// Render observed bars and an optional fitted curve.
pub fn render_ascii_plot(
    series: &RelativeMonthSeries,
    curve: Option<&[(f64, f64)]>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(4);

    let t_min = 0.0;
    let t_max = (series.max_month() + PREDICTION_PADDING_MONTHS) as f64;
    let y_min = 0.0;
    let y_max = y_max(series, curve).unwrap_or(1.0) * 1.05;

    let mut grid = vec![vec![' '; width]; height];

    // Curve first, bars overwrite it.
    if let Some(curve) = curve {
        draw_curve(&mut grid, curve, t_min, t_max, y_min, y_max);
    }

    for p in series.points() {
        if p.defects == 0 {
            continue;
        }
        let x = map_x(p.month as f64, t_min, t_max, width);
        let top = map_y(p.defects as f64, y_min, y_max, height);
        for row in grid.iter_mut().skip(top) {
            row[x] = '#';
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: mes=[{t_min:.0}, {t_max:.0}] | defectos=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn y_max(series: &RelativeMonthSeries, curve: Option<&[(f64, f64)]>) -> Option<f64> {
    let mut max_y = series
        .points()
        .iter()
        .map(|p| p.defects as f64)
        .fold(f64::NEG_INFINITY, f64::max);
    if let Some(curve) = curve {
        for &(_, y) in curve {
            if y.is_finite() {
                max_y = max_y.max(y);
            }
        }
    }
    (max_y.is_finite() && max_y > 0.0).then_some(max_y)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        if !y.is_finite() {
            continue;
        }
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_curve;

    #[test]
    fn plot_golden_snapshot_bars_only() {
        let series = RelativeMonthSeries::from_counts(&[1, 2]);
        let txt = render_ascii_plot(&series, None, 10, 4);
        let expected = concat!(
            "Plot: mes=[0, 4] | defectos=[0.00, 2.10]\n",
            "     #    \n",
            "     #    \n",
            "  #  #    \n",
            "  #  #    \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn zero_months_draw_no_bar() {
        let series = RelativeMonthSeries::from_counts(&[2, 0, 2]);
        let txt = render_ascii_plot(&series, None, 21, 5);
        let last = txt.lines().last().unwrap();
        // Months 1 and 3 only.
        assert_eq!(last.matches('#').count(), 2);
    }

    #[test]
    fn curve_is_drawn_alongside_bars() {
        let series = RelativeMonthSeries::from_counts(&[3, 6, 8, 7, 4, 2]);
        let curve = sample_curve(3.0, 30.0, 0.0, 8.0, 100);
        let txt = render_ascii_plot(&series, Some(&curve), 40, 12);
        assert!(txt.contains('-'));
        assert!(txt.contains('#'));
        assert_eq!(txt.lines().count(), 13);
        assert!(txt.lines().skip(1).all(|l| l.chars().count() == 40));
    }
}
