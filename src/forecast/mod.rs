//! Short-horizon inflation forecasting.
//!
//! The model order is fixed by configuration; there is no order search and no
//! fallback model. Any fitting problem surfaces as a `ModelFit` error so the
//! forecast view can show it instead of a made-up projection.

pub mod arima;

pub use arima::ArimaModel;

use crate::domain::{ForecastConfig, ForecastResult, Series};
use crate::error::AppError;

/// Fit the configured model on `series` and project `config.horizon` months.
pub fn forecast_series(series: &Series, config: &ForecastConfig) -> Result<ForecastResult, AppError> {
    config.validate()?;

    let model = ArimaModel::fit(series, config.order)?;
    log::info!(
        "fitted ARIMA{} on {} month(s): ar={:?} sigma2={:.5}",
        model.order(),
        series.len(),
        model.ar_coefficients(),
        model.sigma2()
    );

    let result = model.forecast(config.horizon, config.confidence_level)?;
    if let Some(mean) = result.mean_point() {
        log::info!(
            "forecast {}..{}: mean {:.3}% per month",
            result.dates.first().map(|d| d.to_string()).unwrap_or_default(),
            result.dates.last().map(|d| d.to_string()).unwrap_or_default(),
            mean
        );
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::synthetic_series;
    use crate::error::ErrorKind;

    #[test]
    fn forecasts_synthetic_ipca_with_defaults() {
        let series = synthetic_series(2005, 1, 240, 42).unwrap();
        let f = forecast_series(&series, &ForecastConfig::default()).unwrap();
        assert_eq!(f.horizon(), 6);
        assert_eq!(f.n_obs, 240);
        for i in 0..f.horizon() {
            assert!(f.lower_bound[i] <= f.point_forecast[i] && f.point_forecast[i] <= f.upper_bound[i]);
        }
    }

    #[test]
    fn moving_average_terms_are_rejected_up_front() {
        let series = synthetic_series(2005, 1, 120, 1).unwrap();
        let cfg = ForecastConfig {
            order: crate::domain::ModelOrder { p: 1, d: 1, q: 1 },
            ..ForecastConfig::default()
        };
        let err = forecast_series(&series, &cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
