//! Display-only aggregation (monthly vs annual).
//!
//! Aggregation never feeds back into analysis: it takes borrowed inputs and
//! returns fresh rows.

use crate::analysis::compound_rates;
use crate::domain::{CumulativeSeries, DateRange, Granularity, Series, YearMonth};

/// One displayed value.
///
/// For annual rows `date` is the last month observed in that year and `months`
/// counts the observations folded into the row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPoint {
    pub date: YearMonth,
    pub value: f64,
    pub months: usize,
}

impl DisplayPoint {
    pub fn label(&self, granularity: Granularity) -> String {
        match granularity {
            Granularity::Monthly => self.date.to_string(),
            Granularity::Annual => {
                if self.months < 12 {
                    format!("{} ({}m)", self.date.year(), self.months)
                } else {
                    self.date.year().to_string()
                }
            }
        }
    }
}

/// Monthly variations restricted to `range`, optionally compounded per year.
pub fn rate_points(series: &Series, range: &DateRange, granularity: Granularity) -> Vec<DisplayPoint> {
    let monthly: Vec<DisplayPoint> = series
        .iter()
        .filter(|o| range.contains(o.date))
        .map(|o| DisplayPoint {
            date: o.date,
            value: o.monthly_variation_pct,
            months: 1,
        })
        .collect();

    match granularity {
        Granularity::Monthly => monthly,
        Granularity::Annual => group_by_year(&monthly, compound_rates),
    }
}

/// Running cumulative values restricted to `range`; annual view keeps each
/// year's last value.
pub fn cumulative_points(
    cumulative: &CumulativeSeries,
    range: &DateRange,
    granularity: Granularity,
) -> Vec<DisplayPoint> {
    let monthly: Vec<DisplayPoint> = cumulative
        .points
        .iter()
        .filter(|p| range.contains(p.date))
        .map(|p| DisplayPoint {
            date: p.date,
            value: p.cumulative_pct,
            months: 1,
        })
        .collect();

    match granularity {
        Granularity::Monthly => monthly,
        Granularity::Annual => group_by_year(&monthly, |values| values.last().copied().unwrap_or(f64::NAN)),
    }
}

fn group_by_year(points: &[DisplayPoint], fold: impl Fn(&[f64]) -> f64) -> Vec<DisplayPoint> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < points.len() {
        let year = points[start].date.year();
        let mut end = start;
        while end < points.len() && points[end].date.year() == year {
            end += 1;
        }
        let values: Vec<f64> = points[start..end].iter().map(|p| p.value).collect();
        out.push(DisplayPoint {
            date: points[end - 1].date,
            value: fold(&values),
            months: end - start,
        });
        start = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compound;
    use crate::domain::Observation;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn series() -> Series {
        let start = ym(2021, 11);
        let rates = [0.95, 0.73, 0.54, 1.01, 1.62];
        Series::new(
            rates
                .iter()
                .enumerate()
                .map(|(i, &r)| Observation::new(start.add_months(i as i64), r))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn annual_rates_compound_within_each_year() {
        let s = series();
        let rows = rate_points(&s, &DateRange::default(), Granularity::Annual);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, ym(2021, 12));
        assert_eq!(rows[0].months, 2);
        assert!((rows[0].value - compound_rates(&[0.95, 0.73])).abs() < 1e-12);
        assert!((rows[1].value - compound_rates(&[0.54, 1.01, 1.62])).abs() < 1e-12);
        assert_eq!(rows[1].label(Granularity::Annual), "2022 (3m)");
    }

    #[test]
    fn annual_cumulative_keeps_year_end_level() {
        let s = series();
        let cum = compound(&s);
        let rows = cumulative_points(&cum, &DateRange::default(), Granularity::Annual);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value, cum.total_pct().unwrap());
    }

    #[test]
    fn range_restricts_without_touching_input() {
        let s = series();
        let before = s.clone();
        let range = DateRange {
            start: Some(ym(2022, 1)),
            end: Some(ym(2022, 2)),
        };
        let rows = rate_points(&s, &range, Granularity::Monthly);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label(Granularity::Monthly), "2022-01");
        assert_eq!(s, before);
    }
}
