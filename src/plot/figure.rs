//! Static SVG figures rendered with Plotters.
//!
//! SVG keeps the export free of native font/raster dependencies; text is written
//! as SVG `<text>` elements and laid out by the viewer.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::AppError;
use crate::present::{ChartData, LineRole, format_year_tick};

/// Default figure size in pixels.
pub const FIGURE_SIZE: (u32, u32) = (1100, 520);

const OBSERVED_COLOR: RGBColor = RGBColor(0, 123, 255);
const CUMULATIVE_COLOR: RGBColor = RGBColor(40, 167, 69);
const FORECAST_COLOR: RGBColor = RGBColor(255, 127, 14);

/// Write `chart` to an SVG file.
pub fn write_chart_svg(path: &Path, chart: &ChartData, size: (u32, u32)) -> Result<(), AppError> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    draw(&root, chart).map_err(|e| AppError::io(format!("Failed to render '{}': {e}", path.display())))?;
    root.present()
        .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", path.display())))?;
    log::info!("wrote figure {}", path.display());
    Ok(())
}

fn draw(root: &DrawingArea<SVGBackend<'_>, Shift>, chart: &ChartData) -> Result<(), DrawingAreaErrorKind<std::io::Error>> {
    root.fill(&WHITE)?;

    let [x0, x1] = chart.x_bounds;
    let [y0, y1] = chart.y_bounds;

    let mut cc = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 22))
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 56)
        .set_label_area_size(LabelAreaPosition::Bottom, 36)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    cc.configure_mesh()
        .x_desc("Date")
        .y_desc(&chart.y_label)
        .x_labels(8)
        .y_labels(8)
        .x_label_formatter(&|v| format_year_tick(*v))
        .y_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;

    if let Some(band) = &chart.band {
        // Closed polygon: upper bound left-to-right, then lower bound back.
        let mut outline: Vec<(f64, f64)> = band.upper.clone();
        outline.extend(band.lower.iter().rev().copied());
        cc.draw_series(std::iter::once(Polygon::new(outline, FORECAST_COLOR.mix(0.2).filled())))?;
    }

    for line in &chart.lines {
        if line.points.is_empty() {
            continue;
        }
        let color = match line.role {
            LineRole::Observed => OBSERVED_COLOR,
            LineRole::Cumulative => CUMULATIVE_COLOR,
            LineRole::Forecast => FORECAST_COLOR,
        };
        cc.draw_series(LineSeries::new(line.points.iter().copied(), color.stroke_width(2)))?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    cc.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::synthetic_series;
    use crate::domain::{DisplayOptions, ForecastConfig};
    use crate::forecast::forecast_series;
    use crate::present::forecast_chart;

    #[test]
    fn writes_forecast_svg() {
        let s = synthetic_series(2015, 1, 96, 4).unwrap();
        let f = forecast_series(&s, &ForecastConfig::default()).unwrap();
        let chart = forecast_chart(&s, &f, &DisplayOptions::default()).unwrap();

        let path = std::env::temp_dir().join(format!("ipca_forecast_{}.svg", std::process::id()));
        write_chart_svg(&path, &chart, (640, 320)).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<polygon") || svg.contains("<path"));
        std::fs::remove_file(path).ok();
    }
}
