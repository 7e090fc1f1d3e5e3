//! Shared dashboard pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> clean -> window -> compound -> forecast
//!
//! Each derived stage keeps its own `Result`, so a failing stage only blanks its
//! own view. Only failing to obtain the base series aborts a run.

use crate::analysis::{Kpis, compound, compute_kpis, filter_window};
use crate::clean::CleanOutput;
use crate::domain::{CumulativeSeries, DashboardConfig, ForecastResult, ForecastScope, Series};
use crate::error::AppError;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Cleaned base series plus cleaning diagnostics.
    pub data: CleanOutput,
    pub window: Series,
    pub cumulative: Result<CumulativeSeries, AppError>,
    pub kpis: Option<Kpis>,
    /// `None` when forecasting is disabled.
    pub forecast: Option<Result<ForecastResult, AppError>>,
}

impl RunOutput {
    /// Series the forecast is fitted on (depends on the configured scope).
    pub fn forecast_input<'a>(&'a self, config: &DashboardConfig) -> &'a Series {
        match config.forecast.scope {
            ForecastScope::Window => &self.window,
            ForecastScope::Full => &self.data.series,
        }
    }
}

/// Load the configured source and run every stage.
pub fn run(config: &DashboardConfig) -> Result<RunOutput, AppError> {
    let data = crate::data::load_series(config)?;
    Ok(run_with_data(config, data))
}

/// Run every stage on already-loaded data.
///
/// The TUI uses this to recompute after option changes without re-fetching.
pub fn run_with_data(config: &DashboardConfig, data: CleanOutput) -> RunOutput {
    let window = filter_window(&data.series, &config.window);
    log::info!(
        "window {}..{}: {} of {} month(s)",
        config.window.start,
        config.window.end.map(|e| e.to_string()).unwrap_or_else(|| "latest".to_string()),
        window.len(),
        data.series.len()
    );

    let cumulative = if window.is_empty() {
        Err(empty_window_error(config))
    } else {
        Ok(compound(&window))
    };
    let kpis = compute_kpis(&window);

    let forecast = config.forecast.enabled.then(|| {
        let input = match config.forecast.scope {
            ForecastScope::Window => &window,
            ForecastScope::Full => &data.series,
        };
        if input.is_empty() {
            return Err(empty_window_error(config));
        }
        crate::forecast::forecast_series(input, &config.forecast)
    });

    for err in [cumulative.as_ref().err(), forecast.as_ref().and_then(|f| f.as_ref().err())]
        .into_iter()
        .flatten()
    {
        log::warn!("stage failed: {err}");
    }

    RunOutput {
        data,
        window,
        cumulative,
        kpis,
        forecast,
    }
}

fn empty_window_error(config: &DashboardConfig) -> AppError {
    AppError::window_empty(format!(
        "No observations on or after {}{}.",
        config.window.start,
        config
            .window
            .end
            .map(|e| format!(" and up to {e}"))
            .unwrap_or_default()
    ))
}
