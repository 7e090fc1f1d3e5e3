//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed / cumulative line: `-`
//! - forecast line: `=`
//! - confidence band: `:` (fills blank cells between the bounds)

use crate::present::{ChartData, LineRole, format_year_tick};

/// Render a chart description into a fixed-size character grid.
pub fn render_ascii_chart(chart: &ChartData, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let [x_min, x_max] = chart.x_bounds;
    let [y_min, y_max] = chart.y_bounds;

    let mut grid = vec![vec![' '; width]; height];

    // Lines first; the band only fills what is left blank.
    for line in &chart.lines {
        let ch = match line.role {
            LineRole::Observed | LineRole::Cumulative => '-',
            LineRole::Forecast => '=',
        };
        draw_polyline(&mut grid, &line.points, [x_min, x_max], [y_min, y_max], ch);
    }

    if let Some(band) = &chart.band {
        for (&(x, lo), &(_, hi)) in band.lower.iter().zip(&band.upper) {
            let col = map_x(x, x_min, x_max, width);
            let top = map_y(hi, y_min, y_max, height);
            let bottom = map_y(lo, y_min, y_max, height);
            for row in grid.iter_mut().take(bottom + 1).skip(top) {
                if row[col] == ' ' {
                    row[col] = ':';
                }
            }
        }
    }

    let mut out = String::new();
    out.push_str(&chart.title);
    out.push('\n');
    out.push_str(&format!(
        "Plot: x=[{}, {}] | y=[{y_min:.2}, {y_max:.2}]{}\n",
        format_year_tick(x_min),
        format_year_tick(x_max),
        chart.y_label
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let has_forecast = chart.lines.iter().any(|l| l.role == LineRole::Forecast);
    if has_forecast {
        let mut legend = String::from("legend: - observed  = forecast");
        if chart.band.is_some() {
            legend.push_str("  : confidence band");
        }
        out.push_str(&legend);
        out.push('\n');
    }

    out
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], points: &[(f64, f64)], xb: [f64; 2], yb: [f64; 2], ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        let cx = map_x(x, xb[0], xb[1], width);
        let cy = map_y(y, yb[0], yb[1], height);
        match prev {
            Some((px, py)) => draw_line(grid, px, py, cx, cy, ch),
            None if grid[cy][cx] == ' ' => grid[cy][cx] = ch,
            None => {}
        }
        prev = Some((cx, cy));
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
    use crate::present::{Band, ChartLine};

    fn chart(lines: Vec<ChartLine>, band: Option<Band>) -> ChartData {
        ChartData {
            title: "test".to_string(),
            y_label: "%".to_string(),
            lines,
            band,
            x_bounds: [0.0, 9.0],
            y_bounds: [0.0, 9.0],
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let c = chart(
            vec![ChartLine {
                label: "observed".to_string(),
                role: LineRole::Observed,
                points: vec![(0.0, 0.0), (9.0, 9.0)],
            }],
            None,
        );

        let txt = render_ascii_chart(&c, 10, 5);
        let expected = concat!(
            "test\n",
            "Plot: x=[0, 9] | y=[0.00, 9.00]%\n",
            "        --\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "--        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn band_fills_between_bounds_and_adds_legend() {
        let c = chart(
            vec![ChartLine {
                label: "forecast".to_string(),
                role: LineRole::Forecast,
                points: vec![(9.0, 4.5)],
            }],
            Some(Band {
                lower: vec![(9.0, 0.0)],
                upper: vec![(9.0, 9.0)],
            }),
        );
        let txt = render_ascii_chart(&c, 10, 5);
        let rows: Vec<&str> = txt.lines().skip(2).take(5).collect();
        let last_col: String = rows.iter().map(|r| r.chars().last().unwrap()).collect();
        assert_eq!(last_col, "::=::");
        assert!(txt.ends_with("legend: - observed  = forecast  : confidence band\n"));
    }
}
