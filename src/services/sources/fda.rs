//! openFDA Drug Label Client
//!
//! Searches drug labels by brand name, retrying by generic name when the
//! brand search returns 404.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use carewise_core::Source;

use super::records::{DrugLabel, SourceRecords};
use super::router::FetchTarget;
use super::{FetchError, SourceClient};
use crate::models::SourceSettings;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LabelResponse {
    results: Vec<LabelEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LabelEntry {
    purpose: Vec<String>,
    warnings: Vec<String>,
    adverse_reactions: Vec<String>,
}

fn first_non_empty(values: Vec<String>) -> Option<String> {
    values.into_iter().next().filter(|v| !v.trim().is_empty())
}

/// Decode a label search response for `drug`.
pub fn parse_labels(body: &str, drug: &str) -> Result<Vec<DrugLabel>, FetchError> {
    let response: LabelResponse = serde_json::from_str(body).map_err(|e| FetchError::Decode {
        origin: Source::Fda,
        message: e.to_string(),
    })?;
    Ok(response
        .results
        .into_iter()
        .map(|entry| DrugLabel {
            drug: drug.to_string(),
            purpose: first_non_empty(entry.purpose),
            warnings: first_non_empty(entry.warnings),
            adverse_reactions: first_non_empty(entry.adverse_reactions),
        })
        .collect())
}

pub struct FdaClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl FdaClient {
    pub fn new(http: reqwest::Client, settings: &SourceSettings) -> Self {
        Self {
            http,
            url: settings.fda_label_url.clone(),
            api_key: settings.fda_api_key.clone(),
        }
    }

    async fn search(
        &self,
        field: &str,
        drug: &str,
        limit: usize,
    ) -> Result<reqwest::Response, FetchError> {
        let mut params = vec![
            ("search", format!("openfda.{}:\"{}\"", field, drug)),
            ("limit", limit.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        Ok(self.http.get(&self.url).query(&params).send().await?)
    }
}

#[async_trait]
impl SourceClient for FdaClient {
    fn source(&self) -> Source {
        Source::Fda
    }

    async fn fetch(&self, target: &FetchTarget, limit: usize) -> Result<SourceRecords, FetchError> {
        let FetchTarget::Drug { name } = target else {
            return Err(FetchError::unsupported(Source::Fda, target));
        };

        let mut response = self.search("brand_name", name, limit).await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(drug = %name, "no brand-name label, trying generic name");
            response = self.search("generic_name", name, limit).await?;
        }
        if !response.status().is_success() {
            return Err(FetchError::Status {
                origin: Source::Fda,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(SourceRecords::Fda(parse_labels(&body, name)?))
    }
}
