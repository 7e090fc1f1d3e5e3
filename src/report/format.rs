//! Terminal formatting for run summaries and tables.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::analysis::Kpis;
use crate::clean::CleanReport;
use crate::domain::{CumulativeSeries, DisplayOptions, ForecastResult, Granularity, Series, WindowSpec};
use crate::error::AppError;
use crate::present::{DisplayPoint, cumulative_points, rate_points};

/// Maximum number of dropped rows listed individually.
const MAX_LISTED_DROPS: usize = 10;

/// Dataset header: source, coverage, and window.
pub fn format_header(source: &str, full: &Series, window: &Series, bounds: &WindowSpec) -> String {
    let mut out = String::new();
    out.push_str("=== ipca - IPCA inflation dashboard ===\n");
    out.push_str(&format!("Source: {source}\n"));
    match (full.first(), full.last()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Data: {} month(s) | {} .. {}\n",
            full.len(),
            first.date,
            last.date
        )),
        _ => out.push_str("Data: (empty)\n"),
    }
    let end = bounds.end.map(|e| e.to_string()).unwrap_or_else(|| "latest".to_string());
    out.push_str(&format!("Window: {} .. {end} | {} month(s)\n", bounds.start, window.len()));
    out
}

/// Cleaning diagnostics. One line when nothing was dropped or missing.
pub fn format_clean_report(report: &CleanReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Cleaning: read={} kept={} dropped={} duplicates={} gaps={}\n",
        report.rows_read,
        report.rows_kept,
        report.dropped.len(),
        report.duplicates.len(),
        report.gaps.len()
    ));
    if report.is_clean() {
        return out;
    }

    for row in report.dropped.iter().take(MAX_LISTED_DROPS) {
        out.push_str(&format!("  dropped row {}: {} ({})\n", row.index, row.raw, row.reason));
    }
    if report.dropped.len() > MAX_LISTED_DROPS {
        out.push_str(&format!("  ... {} more\n", report.dropped.len() - MAX_LISTED_DROPS));
    }
    if !report.duplicates.is_empty() {
        out.push_str(&format!("  duplicate months (first kept): {}\n", join_months(&report.duplicates)));
    }
    if !report.gaps.is_empty() {
        out.push_str(&format!("  missing months: {}\n", join_months(&report.gaps)));
    }
    out
}

/// Headline indicators for the window.
pub fn format_kpis(k: &Kpis) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nIndicators ({} .. {}, {} month(s)):\n", k.start, k.end, k.months));
    out.push_str(&format!("- cumulative inflation : {:>8.2}%\n", k.cumulative_pct));
    out.push_str(&format!("- average monthly      : {:>8.2}%\n", k.average_monthly_pct));
    match k.trailing_12m_pct {
        Some(v) => out.push_str(&format!("- last 12 months       : {v:>8.2}%\n")),
        None => out.push_str("- last 12 months       :      n/a\n"),
    }
    out.push_str(&format!(
        "- highest month        : {:>8.2}% ({})\n",
        k.peak.monthly_variation_pct, k.peak.date
    ));
    out.push_str(&format!(
        "- lowest month         : {:>8.2}% ({})\n",
        k.trough.monthly_variation_pct, k.trough.date
    ));
    out
}

/// Monthly (or annual) variation table, newest first.
pub fn format_series_table(window: &Series, opts: &DisplayOptions) -> String {
    let rows = rate_points(window, &opts.date_range, opts.granularity);
    let heading = match opts.granularity {
        Granularity::Monthly => "monthly_pct",
        Granularity::Annual => "annual_pct",
    };
    format_rows(&rows, opts.granularity, heading)
}

/// Running compounded inflation, newest first.
pub fn format_cumulative_table(cumulative: &CumulativeSeries, opts: &DisplayOptions) -> String {
    let rows = cumulative_points(cumulative, &opts.date_range, opts.granularity);
    format_rows(&rows, opts.granularity, "cumulative_pct")
}

fn format_rows(rows: &[DisplayPoint], granularity: Granularity, heading: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<12} {:>14}\n", "period", heading));
    out.push_str(&format!("{:-<12} {:-<14}\n", "", ""));
    for row in rows.iter().rev() {
        out.push_str(&format!("{:<12} {:>14.2}\n", row.label(granularity), row.value));
    }
    if rows.is_empty() {
        out.push_str("(no rows in the display range)\n");
    }
    out
}

/// Forecast table with interval bounds.
pub fn format_forecast_table(f: &ForecastResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>10} {:>10} {:>10}\n",
        "month",
        "forecast",
        format!("lo{:.0}", f.confidence_level * 100.0),
        format!("hi{:.0}", f.confidence_level * 100.0)
    ));
    out.push_str(&format!("{:-<10} {:-<10} {:-<10} {:-<10}\n", "", "", "", ""));
    for i in 0..f.horizon() {
        out.push_str(&format!(
            "{:<10} {:>10.2} {:>10.2} {:>10.2}\n",
            f.dates[i].to_string(),
            f.point_forecast[i],
            f.lower_bound[i],
            f.upper_bound[i]
        ));
    }
    out
}

/// One-line forecast summary plus model diagnostics.
pub fn format_forecast_headline(f: &ForecastResult) -> String {
    let mut out = String::new();
    if let Some(mean) = f.mean_point() {
        out.push_str(&format!(
            "Average projected monthly inflation over the next {} month(s): {mean:.2}%\n",
            f.horizon()
        ));
    }
    out.push_str(&format!(
        "Model: ARIMA{} on {} month(s) | ar={} | sigma2={:.5}\n",
        f.order,
        f.n_obs,
        fmt_vec(&f.ar_coefficients),
        f.sigma2
    ));
    out
}

/// Placeholder for a stage that failed or produced nothing.
pub fn format_no_data(title: &str, err: &AppError) -> String {
    format!("{title}: no data ({err})\n")
}

fn join_months(months: &[crate::domain::YearMonth]) -> String {
    let parts: Vec<String> = months.iter().map(|m| m.to_string()).collect();
    parts.join(", ")
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compound, compute_kpis};
    use crate::clean::{DroppedRow, RawRecord, clean};
    use crate::domain::{Observation, YearMonth};

    fn series() -> Series {
        let start = YearMonth::new(2022, 11).unwrap();
        let rates = [0.41, 0.62, 0.53, 0.84];
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
    fn series_table_is_newest_first() {
        let txt = format_series_table(&series(), &DisplayOptions::default());
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "period          monthly_pct");
        assert_eq!(lines[2], "2023-02                0.84");
        assert_eq!(lines[5], "2022-11                0.41");
    }

    #[test]
    fn annual_table_labels_partial_years() {
        let opts = DisplayOptions {
            granularity: Granularity::Annual,
            ..DisplayOptions::default()
        };
        let txt = format_cumulative_table(&compound(&series()), &opts);
        assert!(txt.contains("2022 (2m)"));
        assert!(txt.contains("2023 (2m)"));
    }

    #[test]
    fn clean_report_lists_problems() {
        let records = vec![
            RawRecord::text("01/01/2020", "0.21"),
            RawRecord::text("01/03/2020", "0.07"),
            RawRecord::text("garbage", "1"),
        ];
        let out = clean(&records).unwrap();
        let txt = format_clean_report(&out.report);
        assert!(txt.starts_with("Cleaning: read=3 kept=2 dropped=1 duplicates=0 gaps=1\n"));
        assert!(txt.contains("missing months: 2020-02"));
        assert!(txt.contains("dropped row 2"));

        let tidy = CleanReport {
            rows_read: 1,
            rows_kept: 1,
            ..CleanReport::default()
        };
        assert_eq!(format_clean_report(&tidy).lines().count(), 1);

        let many = CleanReport {
            dropped: (0..12)
                .map(|i| DroppedRow {
                    index: i,
                    raw: "x".to_string(),
                    reason: "bad".to_string(),
                })
                .collect(),
            ..CleanReport::default()
        };
        assert!(format_clean_report(&many).contains("... 2 more"));
    }

    #[test]
    fn kpi_block_mentions_window() {
        let k = compute_kpis(&series()).unwrap();
        let txt = format_kpis(&k);
        assert!(txt.contains("2022-11 .. 2023-02, 4 month(s)"));
        assert!(txt.contains("(2023-02)"));
        assert!(txt.contains("n/a"));
    }
}
