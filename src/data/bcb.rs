//! Banco Central do Brasil SGS API integration.
//!
//! SGS ("Sistema Gerenciador de Séries Temporais") serves each statistical series
//! as a JSON array of `{"data": "dd/mm/yyyy", "valor": "..."}` records. IPCA
//! monthly variation is series 433.

use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::clean::{CleanOutput, RawRecord, clean, records_from_json};
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://api.bcb.gov.br/dados/serie";

/// Environment variable overriding the SGS base URL (useful for mirrors and tests).
pub const BASE_URL_ENV: &str = "BCB_SGS_BASE_URL";

pub struct BcbClient {
    client: Client,
    base_url: String,
}

impl BcbClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build a client, honoring `BCB_SGS_BASE_URL` from the environment or `.env`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn series_url(&self, code: u32) -> String {
        format!("{}/bcdata.sgs.{code}/dados", self.base_url)
    }

    /// Fetch and clean a series.
    ///
    /// Fails if the request fails, the payload is malformed, or no record
    /// survives cleaning. There is no retry.
    pub fn fetch_series(
        &self,
        code: u32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<CleanOutput, AppError> {
        let records = self.fetch_raw(code, start, end)?;
        let out = clean(&records)?;
        if out.series.is_empty() {
            return Err(AppError::parse(format!(
                "SGS series {code}: none of {} record(s) could be parsed.",
                out.report.rows_read
            )));
        }
        Ok(out)
    }

    /// Fetch raw records without cleaning.
    pub fn fetch_raw(
        &self,
        code: u32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<RawRecord>, AppError> {
        let url = self.series_url(code);
        let mut req = self.client.get(&url).query(&[("formato", "json")]);

        if let Some(date) = start {
            req = req.query(&[("dataInicial", &sgs_date(date))]);
        }
        if let Some(date) = end {
            req = req.query(&[("dataFinal", &sgs_date(date))]);
        }

        log::info!("fetching SGS series {code} from {url}");

        let resp = req
            .send()
            .map_err(|e| AppError::fetch(format!("SGS request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "SGS request failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::fetch(format!("Failed to read SGS response: {e}")))?;

        let records = parse_response(&body)?;
        log::info!("SGS series {code}: received {} record(s)", records.len());
        Ok(records)
    }
}

/// Decode an SGS JSON body into raw records.
pub fn parse_response(body: &str) -> Result<Vec<RawRecord>, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::fetch("SGS returned an empty body."));
    }
    let values: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| AppError::parse(format!("Failed to parse SGS response: {e}")))?;
    if values.is_empty() {
        return Err(AppError::fetch("SGS returned no observations."));
    }
    Ok(records_from_json(values))
}

fn sgs_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_sgs_payload() {
        let body = r#"[
            {"data": "01/01/2024", "valor": "0.42"},
            {"data": "01/02/2024", "valor": "0.83"}
        ]"#;
        let records = parse_response(body).unwrap();
        assert_eq!(records.len(), 2);
        let out = clean(&records).unwrap();
        assert!((out.series.values()[1] - 0.83).abs() < 1e-12);
    }

    #[test]
    fn wrong_typed_value_drops_one_row() {
        let body = r#"[{"data":"01/01/2020","valor":"0.21"},{"data":"01/02/2020","valor":true}]"#;
        let records = parse_response(body).unwrap();
        assert_eq!(records.len(), 2);
        let out = clean(&records).unwrap();
        assert_eq!(out.series.len(), 1);
        assert!((out.series.values()[0] - 0.21).abs() < 1e-12);
        assert_eq!(out.report.dropped.len(), 1);
        assert_eq!(out.report.dropped[0].index, 1);
    }

    #[test]
    fn error_payloads_are_classified() {
        assert_eq!(parse_response("").unwrap_err().kind(), ErrorKind::Fetch);
        assert_eq!(parse_response("[]").unwrap_err().kind(), ErrorKind::Fetch);
        assert_eq!(
            parse_response(r#"{"error": "Value(s) not found"}"#).unwrap_err().kind(),
            ErrorKind::Parse
        );
    }

    #[test]
    fn builds_series_url_and_query_dates() {
        let client = BcbClient::new("https://example.test/dados/serie/");
        assert_eq!(
            client.series_url(433),
            "https://example.test/dados/serie/bcdata.sgs.433/dados"
        );
        let d = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(sgs_date(d), "01/01/2000");
    }
}
