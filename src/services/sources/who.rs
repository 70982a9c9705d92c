//! WHO Global Health Observatory Client
//!
//! One request per indicator code: `GET {base}{indicator}` returns an OData
//! `value` array of observations.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use carewise_core::Source;

use super::records::{SourceRecords, WhoObservation};
use super::router::FetchTarget;
use super::{send_checked, FetchError, SourceClient};
use crate::models::SourceSettings;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GhoResponse {
    value: Vec<GhoRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GhoRow {
    #[serde(rename = "SpatialDim")]
    spatial_dim: Option<String>,
    #[serde(rename = "TimeDim")]
    time_dim: Option<Value>,
    #[serde(rename = "NumericValue")]
    numeric_value: Option<Value>,
}

fn non_null(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

/// Decode a GHO response, keeping the first `limit` observations.
pub fn parse_observations(
    body: &str,
    indicator: &str,
    topic: &str,
    limit: usize,
) -> Result<Vec<WhoObservation>, FetchError> {
    let response: GhoResponse = serde_json::from_str(body).map_err(|e| FetchError::Decode {
        origin: Source::Who,
        message: e.to_string(),
    })?;
    Ok(response
        .value
        .into_iter()
        .take(limit)
        .map(|row| WhoObservation {
            indicator: indicator.to_string(),
            topic: topic.to_string(),
            country: row.spatial_dim,
            year: non_null(row.time_dim),
            value: non_null(row.numeric_value),
        })
        .collect())
}

pub struct WhoClient {
    http: reqwest::Client,
    base_url: String,
}

impl WhoClient {
    pub fn new(http: reqwest::Client, settings: &SourceSettings) -> Self {
        Self {
            http,
            base_url: settings.who_base_url.clone(),
        }
    }
}

#[async_trait]
impl SourceClient for WhoClient {
    fn source(&self) -> Source {
        Source::Who
    }

    async fn fetch(&self, target: &FetchTarget, limit: usize) -> Result<SourceRecords, FetchError> {
        let FetchTarget::Indicator { topic, indicator } = target else {
            return Err(FetchError::unsupported(Source::Who, target));
        };
        let url = format!("{}{}", self.base_url, indicator);
        let response = send_checked(self.http.get(&url), Source::Who).await?;
        let body = response.text().await?;
        Ok(SourceRecords::Who(parse_observations(
            &body, indicator, topic, limit,
        )?))
    }
}
