//! Distribution helpers for interval estimates.

use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided standard normal critical value for a confidence level in `(0, 1)`.
///
/// `0.95` -> `1.959964...`
pub fn two_sided_z(confidence_level: f64) -> Option<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return None;
    }
    let normal = Normal::new(0.0, 1.0).ok()?;
    let z = normal.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0);
    z.is_finite().then_some(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn z_matches_textbook_values() {
        assert!((two_sided_z(0.95).unwrap() - 1.959964).abs() < 1e-5);
        assert!((two_sided_z(0.80).unwrap() - 1.281552).abs() < 1e-5);
        assert!(two_sided_z(1.0).is_none());
        assert!(two_sided_z(f64::NAN).is_none());
    }
}
