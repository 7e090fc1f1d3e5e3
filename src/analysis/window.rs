//! Restrict a series to an analysis window.

use crate::domain::{Series, WindowSpec, YearMonth};

/// Observations with `date >= start`.
///
/// A start after the last observation yields an empty series, not an error;
/// callers decide whether an empty window is fatal for their view.
pub fn filter_from(series: &Series, start: YearMonth) -> Series {
    filter_window(series, &WindowSpec { start, end: None })
}

/// Observations with `start <= date <= end` (end optional).
pub fn filter_window(series: &Series, window: &WindowSpec) -> Series {
    let obs = series.observations();
    let lo = obs.partition_point(|o| o.date < window.start);
    let hi = match window.end {
        Some(end) => obs.partition_point(|o| o.date <= end),
        None => obs.len(),
    };
    if lo >= hi {
        return Series::empty();
    }
    Series::from_ordered(&obs[lo..hi])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn sample() -> Series {
        Series::new(vec![
            Observation::new(ym(1999, 11), 0.95),
            Observation::new(ym(1999, 12), 0.60),
            Observation::new(ym(2000, 1), 0.62),
            Observation::new(ym(2000, 2), 0.13),
        ])
        .unwrap()
    }

    #[test]
    fn start_before_first_returns_series_unchanged() {
        let s = sample();
        assert_eq!(filter_from(&s, ym(1990, 1)), s);
    }

    #[test]
    fn start_after_last_returns_empty() {
        let s = sample();
        let w = filter_from(&s, ym(2001, 1));
        assert!(w.is_empty());
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let s = sample();
        let w = filter_window(
            &s,
            &WindowSpec {
                start: ym(1999, 12),
                end: Some(ym(2000, 1)),
            },
        );
        let dates: Vec<_> = w.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![ym(1999, 12), ym(2000, 1)]);
    }

    #[test]
    fn inverted_window_is_empty() {
        let s = sample();
        let w = filter_window(
            &s,
            &WindowSpec {
                start: ym(2000, 2),
                end: Some(ym(1999, 12)),
            },
        );
        assert!(w.is_empty());
    }
}
