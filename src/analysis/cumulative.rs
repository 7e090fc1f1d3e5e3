//! Chain-linked (compounded) inflation.
//!
//! Monthly rates are combined by multiplying growth factors:
//!
//! ```text
//! cumulative_n = (Π_{i=1..n} (1 + r_i / 100) - 1) × 100
//! ```
//!
//! Deflation needs no special handling: a negative `r_i` gives a factor below 1.

use crate::domain::{CumulativePoint, CumulativeSeries, Series};

/// Running compounded inflation, one point per observation in the series.
pub fn compound(series: &Series) -> CumulativeSeries {
    let mut factor = 1.0_f64;
    let points = series
        .iter()
        .map(|obs| {
            factor *= 1.0 + obs.monthly_variation_pct / 100.0;
            CumulativePoint {
                date: obs.date,
                cumulative_pct: (factor - 1.0) * 100.0,
            }
        })
        .collect();
    CumulativeSeries { points }
}

/// Compounded inflation of a slice of monthly rates (percent).
pub fn compound_rates(rates: &[f64]) -> f64 {
    let factor = rates.iter().fold(1.0_f64, |acc, r| acc * (1.0 + r / 100.0));
    (factor - 1.0) * 100.0
}

/// Compounded inflation over the last `months` observations.
///
/// Returns `None` when the series is shorter than `months`.
pub fn trailing_compound(series: &Series, months: usize) -> Option<f64> {
    if months == 0 || series.len() < months {
        return None;
    }
    let values = series.values();
    Some(compound_rates(&values[values.len() - months..]))
}
