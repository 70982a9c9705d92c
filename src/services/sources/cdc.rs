//! CDC Open Data Client
//!
//! The Socrata dataset has no full-text search parameter, so rows are pulled
//! with `$limit` and filtered locally.

use async_trait::async_trait;
use serde_json::{Map, Value};

use carewise_core::Source;

use super::records::{CdcRecord, SourceRecords};
use super::router::FetchTarget;
use super::{send_checked, FetchError, SourceClient};
use crate::models::SourceSettings;

type Row = Map<String, Value>;

fn text_field(row: &Row, key: &str) -> Option<String> {
    row.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Keep rows mentioning `term`, or every row when none do.
pub fn filter_rows(rows: Vec<Row>, term: &str) -> Vec<CdcRecord> {
    let needle = term.to_lowercase();
    let matches = |row: &Row| {
        Value::Object(row.clone())
            .to_string()
            .to_lowercase()
            .contains(&needle)
    };

    let selected: Vec<&Row> = if rows.iter().any(|row| matches(row)) {
        rows.iter().filter(|row| matches(*row)).collect()
    } else {
        rows.iter().collect()
    };

    selected
        .into_iter()
        .map(|row| CdcRecord {
            title: text_field(row, "title"),
            description: text_field(row, "short_description"),
        })
        .collect()
}

/// Decode a dataset response and filter it for `term`.
pub fn parse_rows(body: &str, term: &str) -> Result<Vec<CdcRecord>, FetchError> {
    let rows: Vec<Row> = serde_json::from_str(body).map_err(|e| FetchError::Decode {
        origin: Source::Cdc,
        message: e.to_string(),
    })?;
    Ok(filter_rows(rows, term))
}

pub struct CdcClient {
    http: reqwest::Client,
    url: String,
}

impl CdcClient {
    pub fn new(http: reqwest::Client, settings: &SourceSettings) -> Self {
        Self {
            http,
            url: settings.cdc_url.clone(),
        }
    }
}

#[async_trait]
impl SourceClient for CdcClient {
    fn source(&self) -> Source {
        Source::Cdc
    }

    async fn fetch(&self, target: &FetchTarget, limit: usize) -> Result<SourceRecords, FetchError> {
        let FetchTarget::Search { term } = target else {
            return Err(FetchError::unsupported(Source::Cdc, target));
        };
        let params = [("$limit", limit.to_string())];
        let response = send_checked(self.http.get(&self.url).query(&params), Source::Cdc).await?;
        let body = response.text().await?;
        Ok(SourceRecords::Cdc(parse_rows(&body, term)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: &str = r#"[
        {"title": "Flu Vaccination Coverage", "short_description": "Seasonal influenza vaccination rates."},
        {"title": "Heart Disease Mortality", "short_description": "Deaths from heart disease by state."},
        {"year": "2019", "cause_name": "Stroke"}
    ]"#;

    #[test]
    fn test_rows_matching_term_are_kept() {
        let records = parse_rows(ROWS, "Influenza").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("Flu Vaccination Coverage"));
        assert_eq!(
            records[0].description.as_deref(),
            Some("Seasonal influenza vaccination rates.")
        );
    }

    #[test]
    fn test_all_rows_kept_without_match() {
        let records = parse_rows(ROWS, "measles").unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[2].title.is_none());
        assert!(records[2].description.is_none());
    }

    #[test]
    fn test_non_array_body_is_decode_error() {
        assert!(matches!(
            parse_rows(r#"{"error": true}"#, "flu"),
            Err(FetchError::Decode { .. })
        ));
    }
}
