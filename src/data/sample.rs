//! Synthetic IPCA-like series for offline runs and tests.
//!
//! The generator is a mean-reverting AR(1) around a moderate inflation level,
//! plus a small calendar pattern (early-year price resets are typically higher in
//! Brazil's CPI). It is only used when explicitly selected with `--source synthetic`.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Observation, Series, YearMonth};
use crate::error::AppError;

/// Long-run mean monthly variation (%).
const MEAN_PCT: f64 = 0.42;

/// AR(1) persistence of deviations from the mean.
const PERSISTENCE: f64 = 0.55;

/// Innovation standard deviation (percentage points).
const NOISE_SD: f64 = 0.18;

/// Additive calendar effect by month (Jan..Dec), percentage points.
const SEASONAL: [f64; 12] = [
    0.20, 0.15, 0.05, 0.00, -0.05, -0.12, -0.08, -0.10, -0.02, 0.02, 0.00, 0.12,
];

/// Generate `months` consecutive observations starting at `start_year-start_month`.
///
/// The same seed always yields the same series.
pub fn synthetic_series(start_year: i32, start_month: u32, months: usize, seed: u64) -> Result<Series, AppError> {
    let start = YearMonth::new(start_year, start_month)
        .ok_or_else(|| AppError::config(format!("Invalid synthetic start month {start_year}-{start_month}.")))?;
    if months == 0 {
        return Err(AppError::config("Synthetic series length must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, NOISE_SD)
        .map_err(|e| AppError::config(format!("Noise distribution error: {e}")))?;

    let mut deviation = 0.0_f64;
    let mut observations = Vec::with_capacity(months);
    for i in 0..months {
        let date = start.add_months(i as i64);
        deviation = PERSISTENCE * deviation + normal.sample(&mut rng);
        let seasonal = SEASONAL[(date.month() - 1) as usize];
        let value = MEAN_PCT + seasonal + deviation;
        // Two decimals, like the published index.
        observations.push(Observation::new(date, (value * 100.0).round() / 100.0));
    }

    Series::new(observations)
}
