//! ClinicalTrials.gov Client
//!
//! Queries the v2 `studies` endpoint and keeps the identification, status,
//! conditions and design modules of each study.

use async_trait::async_trait;
use serde::Deserialize;

use carewise_core::Source;

use super::records::{SourceRecords, TrialRecord};
use super::router::FetchTarget;
use super::{send_checked, FetchError, SourceClient};
use crate::models::SourceSettings;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StudiesResponse {
    studies: Vec<Study>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Study {
    protocol_section: ProtocolSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProtocolSection {
    identification_module: IdentificationModule,
    status_module: StatusModule,
    conditions_module: ConditionsModule,
    design_module: DesignModule,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IdentificationModule {
    nct_id: Option<String>,
    brief_title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StatusModule {
    overall_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConditionsModule {
    conditions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DesignModule {
    phases: Vec<String>,
}

impl From<Study> for TrialRecord {
    fn from(study: Study) -> Self {
        let section = study.protocol_section;
        TrialRecord {
            nct_id: section.identification_module.nct_id,
            title: section.identification_module.brief_title,
            conditions: section.conditions_module.conditions,
            phases: section.design_module.phases,
            status: section.status_module.overall_status,
        }
    }
}

/// Decode a v2 `studies` response body.
pub fn parse_studies(body: &str) -> Result<Vec<TrialRecord>, FetchError> {
    let response: StudiesResponse = serde_json::from_str(body).map_err(|e| FetchError::Decode {
        origin: Source::ClinicalTrials,
        message: e.to_string(),
    })?;
    Ok(response.studies.into_iter().map(TrialRecord::from).collect())
}

pub struct ClinicalTrialsClient {
    http: reqwest::Client,
    url: String,
}

impl ClinicalTrialsClient {
    pub fn new(http: reqwest::Client, settings: &SourceSettings) -> Self {
        Self {
            http,
            url: settings.clinical_trials_url.clone(),
        }
    }
}

#[async_trait]
impl SourceClient for ClinicalTrialsClient {
    fn source(&self) -> Source {
        Source::ClinicalTrials
    }

    async fn fetch(&self, target: &FetchTarget, limit: usize) -> Result<SourceRecords, FetchError> {
        let FetchTarget::Search { term } = target else {
            return Err(FetchError::unsupported(Source::ClinicalTrials, target));
        };
        let params = [
            ("query.term", term.clone()),
            ("pageSize", limit.to_string()),
            ("format", "json".to_string()),
        ];
        let response =
            send_checked(self.http.get(&self.url).query(&params), Source::ClinicalTrials).await?;
        let body = response.text().await?;
        Ok(SourceRecords::ClinicalTrials(parse_studies(&body)?))
    }
}
