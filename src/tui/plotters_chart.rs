//! Plotters-powered dashboard chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::present::{ChartData, LineRole, format_year_tick};

/// Render-only wrapper around a prepared `ChartData`.
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct DashboardChart<'a> {
    pub chart: &'a ChartData,
}

impl<'a> Widget for DashboardChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let data = self.chart;
        let [x0, x1] = data.x_bounds;
        let [y0, y1] = data.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc(&data.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| format_year_tick(*v))
                .y_label_formatter(&|v| format!("{v:.1}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // High-contrast palette for terminal readability.
            let observed_color = RGBColor(0, 255, 255); // cyan
            let cumulative_color = RGBColor(0, 255, 0); // green
            let forecast_color = RGBColor(255, 165, 0); // orange
            let band_color = RGBColor(120, 90, 40);

            // Band first so the forecast line stays on top. Terminal canvases
            // cannot fill polygons well, so each step gets a vertical stroke.
            if let Some(band) = &data.band {
                for (&(x, lo), &(_, hi)) in band.lower.iter().zip(&band.upper) {
                    chart.draw_series(std::iter::once(PathElement::new(vec![(x, lo), (x, hi)], &band_color)))?;
                }
                chart.draw_series(LineSeries::new(band.lower.iter().copied(), &band_color))?;
                chart.draw_series(LineSeries::new(band.upper.iter().copied(), &band_color))?;
            }

            for line in &data.lines {
                let color = match line.role {
                    LineRole::Observed => observed_color,
                    LineRole::Cumulative => cumulative_color,
                    LineRole::Forecast => forecast_color,
                };
                chart.draw_series(LineSeries::new(line.points.iter().copied(), &color))?;
                // A single point would not show as a line.
                if line.points.len() == 1 {
                    chart.draw_series(line.points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
