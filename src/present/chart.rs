//! Render-ready chart descriptions.
//!
//! A `ChartData` is backend-agnostic: the ASCII renderer, the SVG writer, and the
//! TUI widget all draw from the same struct. X values are fractional years
//! (`YearMonth::as_year_fraction`), Y values are percentages.

use crate::domain::{CumulativeSeries, DisplayOptions, ForecastResult, Granularity, Series, YearMonth};
use crate::error::AppError;
use crate::present::aggregate::{DisplayPoint, cumulative_points, rate_points};

/// Months of history shown in front of a forecast.
pub const FORECAST_HISTORY_MONTHS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Observed,
    Cumulative,
    Forecast,
}

#[derive(Debug, Clone)]
pub struct ChartLine {
    pub label: String,
    pub role: LineRole,
    pub points: Vec<(f64, f64)>,
}

/// Shaded interval around a forecast.
#[derive(Debug, Clone)]
pub struct Band {
    pub lower: Vec<(f64, f64)>,
    pub upper: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct ChartData {
    pub title: String,
    pub y_label: String,
    pub lines: Vec<ChartLine>,
    pub band: Option<Band>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    fn new(title: String, y_label: &str, lines: Vec<ChartLine>, band: Option<Band>) -> Result<Self, AppError> {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for line in &lines {
            for &(x, y) in &line.points {
                xs.push(x);
                ys.push(y);
            }
        }
        if let Some(band) = &band {
            for &(x, y) in band.lower.iter().chain(&band.upper) {
                xs.push(x);
                ys.push(y);
            }
        }
        if xs.is_empty() {
            return Err(AppError::window_empty("No data in the selected display range."));
        }

        let x_bounds = padded_bounds(&xs, 0.0, 1.0 / 12.0);
        let y_bounds = padded_bounds(&ys, 0.05, 0.5);

        Ok(Self {
            title,
            y_label: y_label.to_string(),
            lines,
            band,
            x_bounds,
            y_bounds,
        })
    }
}

/// Monthly (or annual) variation over the window.
pub fn series_chart(window: &Series, opts: &DisplayOptions) -> Result<ChartData, AppError> {
    let points = rate_points(window, &opts.date_range, opts.granularity);
    let title = match opts.granularity {
        Granularity::Monthly => "IPCA monthly variation",
        Granularity::Annual => "IPCA annual variation (compounded)",
    };
    let line = ChartLine {
        label: opts.granularity.label().to_string(),
        role: LineRole::Observed,
        points: to_xy(&points),
    };
    ChartData::new(title.to_string(), "%", vec![line], None)
}

/// Running compounded inflation over the window.
pub fn cumulative_chart(cumulative: &CumulativeSeries, opts: &DisplayOptions) -> Result<ChartData, AppError> {
    let points = cumulative_points(cumulative, &opts.date_range, opts.granularity);
    let title = match (cumulative.start(), cumulative.total_pct()) {
        (Some(start), Some(total)) => format!("Cumulative IPCA since {start} ({total:.2}%)"),
        _ => "Cumulative IPCA".to_string(),
    };
    let line = ChartLine {
        label: "cumulative".to_string(),
        role: LineRole::Cumulative,
        points: to_xy(&points),
    };
    ChartData::new(title, "%", vec![line], None)
}

/// Recent history followed by the forecast (always monthly).
pub fn forecast_chart(history: &Series, forecast: &ForecastResult, opts: &DisplayOptions) -> Result<ChartData, AppError> {
    let range = &opts.date_range;
    let cutoff = history
        .last()
        .map(|o| o.date.add_months(1 - FORECAST_HISTORY_MONTHS))
        .unwrap_or(YearMonth::DEFAULT_START);

    let observed: Vec<(f64, f64)> = history
        .iter()
        .filter(|o| o.date >= cutoff && range.contains(o.date))
        .map(|o| (o.date.as_year_fraction(), o.monthly_variation_pct))
        .collect();

    let mut projected: Vec<(f64, f64)> = Vec::with_capacity(forecast.horizon() + 1);
    // Join the projection to the last observed point so the line is continuous.
    if let Some(last) = history.last().filter(|o| range.contains(o.date)) {
        projected.push((last.date.as_year_fraction(), last.monthly_variation_pct));
    }
    let mut lower = Vec::new();
    let mut upper = Vec::new();
    for i in 0..forecast.horizon() {
        let date = forecast.dates[i];
        if !range.contains(date) {
            continue;
        }
        let x = date.as_year_fraction();
        projected.push((x, forecast.point_forecast[i]));
        lower.push((x, forecast.lower_bound[i]));
        upper.push((x, forecast.upper_bound[i]));
    }

    let band = (opts.show_confidence_band && !lower.is_empty()).then_some(Band { lower, upper });
    let title = format!(
        "{}-month IPCA projection, ARIMA{} ({:.0}% band)",
        forecast.horizon(),
        forecast.order,
        forecast.confidence_level * 100.0
    );

    let lines = vec![
        ChartLine {
            label: "observed".to_string(),
            role: LineRole::Observed,
            points: observed,
        },
        ChartLine {
            label: "forecast".to_string(),
            role: LineRole::Forecast,
            points: projected,
        },
    ];
    ChartData::new(title, "%", lines, band)
}

fn to_xy(points: &[DisplayPoint]) -> Vec<(f64, f64)> {
    points.iter().map(|p| (p.date.as_year_fraction(), p.value)).collect()
}

/// `[min, max]` padded by `frac` of the span (or `min_pad` when the span is 0).
fn padded_bounds(values: &[f64], frac: f64, min_pad: f64) -> [f64; 2] {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return [0.0, 1.0];
    }
    let span = hi - lo;
    let pad = if span > 1e-12 { span * frac } else { min_pad };
    [lo - pad, hi + pad]
}

/// Axis tick label for a fractional-year x value.
pub fn format_year_tick(x: f64) -> String {
    let year = x.floor();
    let month = ((x - year) * 12.0).round() as i64 + 1;
    if month <= 1 || month > 12 {
        format!("{:.0}", x.round())
    } else {
        format!("{year:.0}-{month:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compound;
    use crate::data::sample::synthetic_series;
    use crate::domain::{DateRange, ForecastConfig};
    use crate::error::ErrorKind;
    use crate::forecast::forecast_series;

    #[test]
    fn forecast_chart_honors_band_toggle() {
        let s = synthetic_series(2010, 1, 120, 3).unwrap();
        let f = forecast_series(&s, &ForecastConfig::default()).unwrap();

        let with_band = forecast_chart(&s, &f, &DisplayOptions::default()).unwrap();
        let band = with_band.band.as_ref().unwrap();
        assert_eq!(band.lower.len(), 6);
        assert_eq!(with_band.lines[0].points.len(), FORECAST_HISTORY_MONTHS as usize);
        // Forecast line starts at the last observation.
        assert_eq!(with_band.lines[1].points.len(), 7);

        let opts = DisplayOptions {
            show_confidence_band: false,
            ..DisplayOptions::default()
        };
        assert!(forecast_chart(&s, &f, &opts).unwrap().band.is_none());
    }

    #[test]
    fn empty_display_range_is_no_data() {
        let s = synthetic_series(2010, 1, 24, 3).unwrap();
        let opts = DisplayOptions {
            date_range: DateRange {
                start: Some(YearMonth::new(2030, 1).unwrap()),
                end: None,
            },
            ..DisplayOptions::default()
        };
        let err = series_chart(&s, &opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WindowEmpty);
        assert!(cumulative_chart(&compound(&Series::empty()), &DisplayOptions::default()).is_err());
    }

    #[test]
    fn bounds_cover_all_points() {
        let s = synthetic_series(2010, 1, 36, 8).unwrap();
        let chart = series_chart(&s, &DisplayOptions::default()).unwrap();
        for &(x, y) in &chart.lines[0].points {
            assert!(x >= chart.x_bounds[0] && x <= chart.x_bounds[1]);
            assert!(y > chart.y_bounds[0] && y < chart.y_bounds[1]);
        }
    }

    #[test]
    fn year_ticks() {
        assert_eq!(format_year_tick(2020.0), "2020");
        assert_eq!(format_year_tick(2020.5), "2020-07");
    }
}
