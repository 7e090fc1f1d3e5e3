//! Export computed tables to CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.
//! Values are written with full precision; formatting for humans lives in `report`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{CumulativeSeries, ForecastResult, Series};
use crate::error::AppError;

fn create(path: &Path) -> Result<BufWriter<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

fn write_err(e: std::io::Error) -> AppError {
    AppError::io(format!("Failed to write export CSV: {e}"))
}

/// Write the windowed monthly series.
pub fn write_series_csv(path: &Path, series: &Series) -> Result<(), AppError> {
    let mut out = create(path)?;
    writeln!(out, "month,monthly_variation_pct").map_err(write_err)?;
    for obs in series.iter() {
        writeln!(out, "{},{}", obs.date, obs.monthly_variation_pct).map_err(write_err)?;
    }
    out.flush().map_err(write_err)
}

/// Write the running compounded inflation.
pub fn write_cumulative_csv(path: &Path, cumulative: &CumulativeSeries) -> Result<(), AppError> {
    let mut out = create(path)?;
    writeln!(out, "month,cumulative_pct").map_err(write_err)?;
    for p in &cumulative.points {
        writeln!(out, "{},{:.10}", p.date, p.cumulative_pct).map_err(write_err)?;
    }
    out.flush().map_err(write_err)
}

/// Write the forecast with its interval bounds.
pub fn write_forecast_csv(path: &Path, forecast: &ForecastResult) -> Result<(), AppError> {
    let mut out = create(path)?;
    writeln!(out, "month,forecast_pct,lower_pct,upper_pct,confidence_level").map_err(write_err)?;
    for i in 0..forecast.horizon() {
        writeln!(
            out,
            "{},{:.10},{:.10},{:.10},{}",
            forecast.dates[i],
            forecast.point_forecast[i],
            forecast.lower_bound[i],
            forecast.upper_bound[i],
            forecast.confidence_level
        )
        .map_err(write_err)?;
    }
    out.flush().map_err(write_err)
}
