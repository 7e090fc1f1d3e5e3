//! Record cleaning and normalization.
//!
//! This module is responsible for turning heterogeneous raw records (API JSON,
//! CSV exports, hand-edited files) into a clean `Series` that is safe to analyze.
//!
//! Design goals:
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (first occurrence of a month wins)
//! - **Separation of concerns**: no network or analysis logic here

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Observation, Series, YearMonth};
use crate::error::AppError;

/// A raw field as it arrives from JSON or CSV.
///
/// `Other` holds any JSON value of the wrong type (bool, array, object) so a
/// single odd row is dropped by the cleaner instead of failing the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawField {
    fn describe(&self) -> String {
        match self {
            RawField::Number(v) => v.to_string(),
            RawField::Text(s) => format!("'{s}'"),
            RawField::Other(v) => v.to_string(),
        }
    }
}

/// One unvalidated `(date, value)` record.
///
/// The BCB API names the fields `data` / `valor`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(alias = "data", default)]
    pub date: Option<RawField>,
    #[serde(alias = "valor", default)]
    pub value: Option<RawField>,
}

impl RawRecord {
    pub fn text(date: &str, value: &str) -> Self {
        Self {
            date: Some(RawField::Text(date.to_string())),
            value: Some(RawField::Text(value.to_string())),
        }
    }

    fn describe(&self) -> String {
        let d = self.date.as_ref().map(RawField::describe).unwrap_or_else(|| "null".to_string());
        let v = self.value.as_ref().map(RawField::describe).unwrap_or_else(|| "null".to_string());
        format!("date={d} value={v}")
    }
}

/// Convert decoded JSON array elements into records.
///
/// Elements that are not record-shaped (`null`, numbers, nested arrays) become
/// empty records, which the cleaner then drops and reports.
pub fn records_from_json(values: Vec<serde_json::Value>) -> Vec<RawRecord> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<RawRecord>(value).unwrap_or_else(|e| {
                log::warn!("record #{index} is not an object: {e}");
                RawRecord { date: None, value: None }
            })
        })
        .collect()
}

impl From<&Observation> for RawRecord {
    /// Render an observation in the API's own shape (`dd/mm/yyyy`, numeric value).
    fn from(obs: &Observation) -> Self {
        Self {
            date: Some(RawField::Text(format!(
                "01/{:02}/{:04}",
                obs.date.month(),
                obs.date.year()
            ))),
            value: Some(RawField::Number(obs.monthly_variation_pct)),
        }
    }
}

/// A record dropped during cleaning.
#[derive(Debug, Clone)]
pub struct DroppedRow {
    /// Zero-based position in the raw input.
    pub index: usize,
    pub raw: String,
    pub reason: String,
}

/// What the cleaner did to the input.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped: Vec<DroppedRow>,
    /// Months seen more than once (later occurrences were dropped).
    pub duplicates: Vec<YearMonth>,
    /// Months missing between the first and last kept observation.
    pub gaps: Vec<YearMonth>,
}

impl CleanReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.duplicates.is_empty() && self.gaps.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub series: Series,
    pub report: CleanReport,
}

/// Clean raw records into a `Series`.
///
/// Unparsable rows are dropped and listed in the report (and logged); they never
/// abort the run. The output is sorted by month with duplicates removed.
pub fn clean(records: &[RawRecord]) -> Result<CleanOutput, AppError> {
    let mut report = CleanReport {
        rows_read: records.len(),
        ..CleanReport::default()
    };

    let mut parsed: Vec<(usize, Observation)> = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match parse_record(record) {
            Ok(obs) => parsed.push((index, obs)),
            Err(reason) => {
                log::warn!("dropping record #{index} ({}): {reason}", record.describe());
                report.dropped.push(DroppedRow {
                    index,
                    raw: record.describe(),
                    reason,
                });
            }
        }
    }

    // Stable sort keeps input order among equal months, so "first wins" below
    // refers to the original record order.
    parsed.sort_by_key(|(_, obs)| obs.date);

    let mut observations: Vec<Observation> = Vec::with_capacity(parsed.len());
    for (index, obs) in parsed {
        if observations.last().is_some_and(|prev| prev.date == obs.date) {
            log::warn!("dropping duplicate month {} (record #{index})", obs.date);
            if report.duplicates.last() != Some(&obs.date) {
                report.duplicates.push(obs.date);
            }
            continue;
        }
        observations.push(obs);
    }

    let series = Series::new(observations)?;
    report.rows_kept = series.len();
    report.gaps = series.gaps();
    if !report.gaps.is_empty() {
        log::warn!(
            "series has {} missing month(s), first: {}",
            report.gaps.len(),
            report.gaps[0]
        );
    }

    log::info!(
        "cleaned {} record(s): kept {}, dropped {}, duplicates {}",
        report.rows_read,
        report.rows_kept,
        report.dropped.len(),
        report.duplicates.len()
    );

    Ok(CleanOutput { series, report })
}

fn parse_record(record: &RawRecord) -> Result<Observation, String> {
    let date = match &record.date {
        Some(field) => parse_month(field)?,
        None => return Err("missing date".to_string()),
    };
    let value = match &record.value {
        Some(field) => parse_value(field)?,
        None => return Err("missing value".to_string()),
    };
    Ok(Observation::new(date, value))
}

/// Parse a date-like field into a calendar month.
pub fn parse_month(field: &RawField) -> Result<YearMonth, String> {
    let text = match field {
        RawField::Text(s) => s.trim().to_string(),
        RawField::Number(v) if v.fract() == 0.0 && *v >= 0.0 => format!("{}", *v as u64),
        RawField::Number(v) => return Err(format!("invalid date {v}")),
        RawField::Other(v) => return Err(format!("invalid date {v}")),
    };
    if text.is_empty() {
        return Err("empty date".to_string());
    }

    // Full dates: the API uses `dd/mm/yyyy`; exports commonly use ISO.
    const DATE_FMTS: [&str; 4] = ["%d/%m/%Y", "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(&text, fmt) {
            return Ok(YearMonth::from_date(d));
        }
    }

    // Month-only forms: `yyyy-mm`, `mm/yyyy`, `yyyymm`.
    let month_only = if let Some((y, m)) = text.split_once('-') {
        pair_to_month(y, m)
    } else if let Some((m, y)) = text.split_once('/') {
        pair_to_month(y, m)
    } else if text.len() == 6 && text.chars().all(|c| c.is_ascii_digit()) {
        pair_to_month(&text[..4], &text[4..])
    } else {
        None
    };

    month_only.ok_or_else(|| format!("unparsable date '{text}'"))
}

fn pair_to_month(year: &str, month: &str) -> Option<YearMonth> {
    if year.len() != 4 {
        return None;
    }
    let y = year.parse::<i32>().ok()?;
    let m = month.parse::<u32>().ok()?;
    YearMonth::new(y, m)
}

/// Parse a value field into a finite percentage.
pub fn parse_value(field: &RawField) -> Result<f64, String> {
    let v = match field {
        RawField::Number(v) => *v,
        RawField::Other(v) => return Err(format!("non-numeric value {v}")),
        RawField::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "." || trimmed == "-" {
                return Err("empty value".to_string());
            }
            // Brazilian sources sometimes use a decimal comma (`0,56`).
            let normalized = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
                trimmed.replace(',', ".")
            } else {
                trimmed.to_string()
            };
            normalized
                .parse::<f64>()
                .map_err(|_| format!("non-numeric value '{trimmed}'"))?
        }
    };
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("non-finite value {v}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn parses_heterogeneous_dates_and_numbers() {
        let records = vec![
            RawRecord::text("01/02/2020", "0.25"),
            RawRecord::text("2020-01-01", "0,21"),
            RawRecord {
                date: Some(RawField::Text("2020-03".to_string())),
                value: Some(RawField::Number(0.07)),
            },
            RawRecord {
                date: Some(RawField::Number(202004.0)),
                value: Some(RawField::Text(" -0.31 ".to_string())),
            },
        ];
        let out = clean(&records).unwrap();
        assert!(out.report.is_clean());
        let dates: Vec<_> = out.series.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![ym(2020, 1), ym(2020, 2), ym(2020, 3), ym(2020, 4)]);
        assert!((out.series.values()[0] - 0.21).abs() < 1e-12);
        assert!((out.series.values()[3] + 0.31).abs() < 1e-12);
    }

    #[test]
    fn drops_malformed_rows_observably() {
        let records = vec![
            RawRecord::text("01/01/2020", "0.21"),
            RawRecord::text("not a date", "0.5"),
            RawRecord::text("01/02/2020", "abc"),
            RawRecord::text("01/03/2020", ""),
            RawRecord {
                date: None,
                value: Some(RawField::Number(1.0)),
            },
        ];
        let out = clean(&records).unwrap();
        assert_eq!(out.report.rows_read, 5);
        assert_eq!(out.report.rows_kept, 1);
        assert_eq!(out.report.dropped.len(), 4);
        let idx: Vec<_> = out.report.dropped.iter().map(|d| d.index).collect();
        assert_eq!(idx, vec![1, 2, 3, 4]);
        assert!(out.report.dropped[1].reason.contains("non-numeric"));
    }

    #[test]
    fn first_duplicate_wins_and_gaps_are_listed() {
        let records = vec![
            RawRecord::text("01/01/2020", "0.1"),
            RawRecord::text("01/01/2020", "9.9"),
            RawRecord::text("01/04/2020", "0.4"),
        ];
        let out = clean(&records).unwrap();
        assert_eq!(out.series.len(), 2);
        assert!((out.series.values()[0] - 0.1).abs() < 1e-12);
        assert_eq!(out.report.duplicates, vec![ym(2020, 1)]);
        assert_eq!(out.report.gaps, vec![ym(2020, 2), ym(2020, 3)]);
    }

    #[test]
    fn cleaning_is_idempotent_on_clean_data() {
        let records = vec![
            RawRecord::text("01/03/2021", "0.93"),
            RawRecord::text("01/01/2021", "0.25"),
            RawRecord::text("01/02/2021", "0.86"),
        ];
        let first = clean(&records).unwrap().series;
        let again: Vec<RawRecord> = first.iter().map(RawRecord::from).collect();
        let second = clean(&again).unwrap();
        assert_eq!(first, second.series);
        assert!(second.report.is_clean());
    }

    #[test]
    fn decodes_api_shaped_json() {
        let body = r#"[{"data":"01/01/1980","valor":"6.62"},{"data":"01/02/1980","valor":4.62},{"data":"01/03/1980","valor":null}]"#;
        let records: Vec<RawRecord> = serde_json::from_str(body).unwrap();
        let out = clean(&records).unwrap();
        assert_eq!(out.series.len(), 2);
        assert_eq!(out.report.dropped.len(), 1);
        assert_eq!(out.report.dropped[0].reason, "missing value");
    }

    #[test]
    fn wrong_typed_fields_drop_only_their_row() {
        let body = r#"[
            {"data":"01/01/2020","valor":"0.21"},
            {"data":"01/02/2020","valor":true},
            {"data":"01/03/2020","valor":{"v":1}},
            {"data":["01/04/2020"],"valor":"0.31"},
            null,
            {"data":"01/05/2020","valor":"0.26"}
        ]"#;
        let values: Vec<serde_json::Value> = serde_json::from_str(body).unwrap();
        let records = records_from_json(values);
        assert_eq!(records.len(), 6);

        let out = clean(&records).unwrap();
        assert_eq!(out.series.len(), 2);
        assert_eq!(out.report.rows_read, 6);
        let reasons: Vec<&str> = out.report.dropped.iter().map(|d| d.reason.as_str()).collect();
        assert_eq!(
            reasons,
            vec![
                "non-numeric value true",
                r#"non-numeric value {"v":1}"#,
                r#"invalid date ["01/04/2020"]"#,
                "missing date",
            ]
        );
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(parse_value(&RawField::Text("NaN".to_string())).is_err());
        assert!(parse_value(&RawField::Text("inf".to_string())).is_err());
        assert!(parse_value(&RawField::Text("1,234.5".to_string())).is_err());
    }
}
