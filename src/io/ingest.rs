//! Local file ingest (CSV or JSON exports of the series).
//!
//! This module only turns a file into raw records; all value/date validation
//! happens in the cleaner so file and API data follow exactly the same rules.
//!
//! - JSON: same shape as the SGS API (`[{"data": ..., "valor": ...}]`)
//! - CSV: a header row with a date column and a value column. Comma or
//!   semicolon delimited (spreadsheet exports in Brazil usually use `;`).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::StringRecord;

use crate::clean::{RawField, RawRecord, records_from_json};
use crate::error::AppError;

/// Accepted header names for the date column (after normalization).
const DATE_COLUMNS: [&str; 4] = ["date", "data", "month", "mes"];

/// Accepted header names for the value column (after normalization).
const VALUE_COLUMNS: [&str; 5] = ["value", "valor", "ipca", "monthly_variation_pct", "variation"];

/// Load raw records from a `.json` or CSV file.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>, AppError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let records = if is_json {
        load_json(path)?
    } else {
        load_csv(path)?
    };

    if records.is_empty() {
        return Err(AppError::parse(format!("No records found in '{}'.", path.display())));
    }
    log::info!("read {} record(s) from {}", records.len(), path.display());
    Ok(records)
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::io(format!("Failed to open '{}': {e}", path.display())))
}

fn load_json(path: &Path) -> Result<Vec<RawRecord>, AppError> {
    let file = open(path)?;
    let values: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::parse(format!("Invalid JSON in '{}': {e}", path.display())))?;
    Ok(records_from_json(values))
}

fn load_csv(path: &Path) -> Result<Vec<RawRecord>, AppError> {
    let delimiter = sniff_delimiter(path)?;
    let file = open(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::parse(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = find_column(&header_map, &DATE_COLUMNS)
        .ok_or_else(|| AppError::parse(format!("Missing date column (one of: {}).", DATE_COLUMNS.join(", "))))?;
    let value_idx = find_column(&header_map, &VALUE_COLUMNS)
        .ok_or_else(|| AppError::parse(format!("Missing value column (one of: {}).", VALUE_COLUMNS.join(", "))))?;

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        match result {
            Ok(record) => out.push(RawRecord {
                date: get_field(&record, date_idx),
                value: get_field(&record, value_idx),
            }),
            Err(e) => {
                // +2: header line, 1-based lines. The cleaner reports the row as dropped.
                log::warn!("CSV parse error on line {}: {e}", idx + 2);
                out.push(RawRecord { date: None, value: None });
            }
        }
    }
    Ok(out)
}

/// Pick `;` when the header line has semicolons but no commas.
fn sniff_delimiter(path: &Path) -> Result<u8, AppError> {
    let mut first = String::new();
    BufReader::new(open(path)?)
        .read_line(&mut first)
        .map_err(|e| AppError::io(format!("Failed to read '{}': {e}", path.display())))?;
    Ok(if first.contains(';') && !first.contains(',') { b';' } else { b',' })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, the date column is never found.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn get_field(record: &StringRecord, idx: usize) -> Option<RawField> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| RawField::Text(s.to_string()))
}
