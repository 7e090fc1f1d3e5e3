//! Data sources: SGS API, local files, and synthetic series.
//!
//! Every source goes through the same cleaner and yields a `CleanOutput`.
//! Sources are chosen explicitly; a failing source never falls back to another.

pub mod bcb;
pub mod sample;

pub use bcb::BcbClient;

use crate::clean::{CleanOutput, CleanReport, clean};
use crate::domain::{DashboardConfig, SourceKind};
use crate::error::AppError;

/// Length of the synthetic series (1995-01 onwards, 30 years).
const SYNTHETIC_MONTHS: usize = 360;

/// Load the base series for a session.
pub fn load_series(config: &DashboardConfig) -> Result<CleanOutput, AppError> {
    match config.source {
        SourceKind::Bcb => BcbClient::from_env().fetch_series(config.series_code, None, None),
        SourceKind::File => {
            let path = config
                .input_path
                .as_ref()
                .ok_or_else(|| AppError::config("`--source file` requires `--input <PATH>`."))?;
            let records = crate::io::ingest::load_records(path)?;
            let out = clean(&records)?;
            if out.series.is_empty() {
                return Err(AppError::parse(format!(
                    "None of {} record(s) in '{}' could be parsed.",
                    out.report.rows_read,
                    path.display()
                )));
            }
            Ok(out)
        }
        SourceKind::Synthetic => {
            let series = sample::synthetic_series(1995, 1, SYNTHETIC_MONTHS, config.seed)?;
            let report = CleanReport {
                rows_read: series.len(),
                rows_kept: series.len(),
                ..CleanReport::default()
            };
            Ok(CleanOutput { series, report })
        }
    }
}

/// Short human-readable label for headers and status lines.
pub fn source_label(config: &DashboardConfig) -> String {
    match config.source {
        SourceKind::Bcb => format!("BCB SGS {}", config.series_code),
        SourceKind::File => config
            .input_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "file".to_string()),
        SourceKind::Synthetic => format!("synthetic (seed {})", config.seed),
    }
}
