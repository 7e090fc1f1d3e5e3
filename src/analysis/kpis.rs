//! Headline indicators for the selected window.

use crate::analysis::cumulative::{compound, trailing_compound};
use crate::domain::{Observation, Series, YearMonth};

/// Summary metrics shown above the charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub months: usize,
    pub start: YearMonth,
    pub end: YearMonth,
    /// Compounded inflation over the window (percent).
    pub cumulative_pct: f64,
    pub average_monthly_pct: f64,
    pub peak: Observation,
    pub trough: Observation,
    /// Compounded inflation over the last 12 months of the window, when available.
    pub trailing_12m_pct: Option<f64>,
}

/// Compute KPIs for a window; `None` when the window is empty.
pub fn compute_kpis(window: &Series) -> Option<Kpis> {
    let first = window.first()?;
    let last = window.last()?;

    let mut peak = *first;
    let mut trough = *first;
    let mut sum = 0.0;
    for obs in window.iter() {
        // Ties keep the earliest month.
        if obs.monthly_variation_pct > peak.monthly_variation_pct {
            peak = *obs;
        }
        if obs.monthly_variation_pct < trough.monthly_variation_pct {
            trough = *obs;
        }
        sum += obs.monthly_variation_pct;
    }

    Some(Kpis {
        months: window.len(),
        start: first.date,
        end: last.date,
        cumulative_pct: compound(window).total_pct()?,
        average_monthly_pct: sum / window.len() as f64,
        peak,
        trough,
        trailing_12m_pct: trailing_compound(window, 12),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kpis_pick_peak_trough_and_mean() {
        let start = YearMonth::new(2022, 1).unwrap();
        let rates = [0.54, 1.01, 1.62, -0.68, 0.26];
        let obs = rates
            .iter()
            .enumerate()
            .map(|(i, &r)| Observation::new(start.add_months(i as i64), r))
            .collect();
        let s = Series::new(obs).unwrap();

        let k = compute_kpis(&s).unwrap();
        assert_eq!(k.months, 5);
        assert_eq!(k.peak.date, YearMonth::new(2022, 3).unwrap());
        assert_eq!(k.trough.date, YearMonth::new(2022, 4).unwrap());
        assert!((k.average_monthly_pct - rates.iter().sum::<f64>() / 5.0).abs() < 1e-12);
        assert_eq!(k.trailing_12m_pct, None);
    }

    #[test]
    fn empty_window_has_no_kpis() {
        assert!(compute_kpis(&Series::empty()).is_none());
    }
}
