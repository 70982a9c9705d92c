//! Evidence Sources
//!
//! Routing of a validated plan to per-source fetch requests, and the HTTP
//! clients that answer them.
//!
//! ## Module Organization
//!
//! - `router` - Pure plan-to-request routing (search terms, drug, indicators)
//! - `records` - Raw per-source record types and `RawResults`
//! - `pubmed`, `clinical_trials`, `fda`, `medlineplus`, `cdc`, `who` - Clients

pub mod cdc;
pub mod clinical_trials;
pub mod fda;
pub mod medlineplus;
pub mod pubmed;
pub mod records;
pub mod router;
pub mod who;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use carewise_core::Source;
use carewise_llm::{build_http_client, ProxyConfig};

use crate::models::SourceSettings;
use crate::utils::error::{AppError, AppResult};

pub use records::{
    CdcRecord, DrugLabel, HealthTopic, PubMedArticle, RawResults, SourceRecords, TrialRecord,
    WhoObservation,
};
pub use router::{
    build_search_term, route_plan, who_indicator, FetchRequest, FetchTarget, RoutingPlan,
    RoutingSkip,
};

/// Failure of a single fetch request.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{origin} returned HTTP {status}")]
    Status { origin: Source, status: u16 },

    #[error("Failed to decode {origin} response: {message}")]
    Decode { origin: Source, message: String },

    #[error("Failed to parse {origin} XML: {message}")]
    Xml { origin: Source, message: String },

    #[error("{origin} client cannot fetch {target}")]
    MissingTarget { origin: Source, target: String },
}

impl FetchError {
    pub fn unsupported(origin: Source, target: &FetchTarget) -> Self {
        FetchError::MissingTarget {
            origin,
            target: target.to_string(),
        }
    }
}

/// A client for one evidence source.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// The source this client serves.
    fn source(&self) -> Source;

    /// Fetch up to `limit` raw records for `target`.
    async fn fetch(&self, target: &FetchTarget, limit: usize) -> Result<SourceRecords, FetchError>;
}

/// Send a request and reject non-success statuses.
pub(crate) async fn send_checked(
    request: reqwest::RequestBuilder,
    origin: Source,
) -> Result<reqwest::Response, FetchError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            origin,
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Clients keyed by source.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    clients: HashMap<Source, Arc<dyn SourceClient>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client, replacing any previous client for its source.
    pub fn register(&mut self, client: Arc<dyn SourceClient>) {
        self.clients.insert(client.source(), client);
    }

    pub fn get(&self, source: Source) -> Option<Arc<dyn SourceClient>> {
        self.clients.get(&source).cloned()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Build the HTTP clients for all six sources.
    ///
    /// They share one reqwest client carrying the source timeout and proxy.
    pub fn from_settings(settings: &SourceSettings, proxy: Option<&ProxyConfig>) -> AppResult<Self> {
        let http = build_http_client(Duration::from_secs(settings.timeout_secs), proxy)
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {}", e)))?;

        let mut registry = Self::new();
        registry.register(Arc::new(pubmed::PubMedClient::new(http.clone(), settings)));
        registry.register(Arc::new(clinical_trials::ClinicalTrialsClient::new(
            http.clone(),
            settings,
        )));
        registry.register(Arc::new(fda::FdaClient::new(http.clone(), settings)));
        registry.register(Arc::new(medlineplus::MedlinePlusClient::new(
            http.clone(),
            settings,
        )));
        registry.register(Arc::new(cdc::CdcClient::new(http.clone(), settings)));
        registry.register(Arc::new(who::WhoClient::new(http, settings)));
        Ok(registry)
    }
}
