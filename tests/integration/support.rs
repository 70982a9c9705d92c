//! Shared test doubles: a scripted text-completion provider and counting
//! source clients.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use carewise::services::sources::{FetchError, FetchTarget, SourceClient, SourceRecords};
use carewise_core::Source;
use carewise_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
};

pub const VALID_TRIALS_PLAN: &str = r#"{
  "intent": "CLINICAL_TRIALS",
  "entities": {"diseases": ["melanoma"], "drugs": [], "therapies": ["CAR-T"], "symptoms": [], "topics": []},
  "sources": ["ClinicalTrials", "PubMed"],
  "analysis_required": false
}"#;

pub const MIXED_GROUP_PLAN: &str = r#"{
  "intent": "CLINICAL_TRIALS",
  "entities": {"diseases": ["melanoma"], "drugs": [], "therapies": [], "symptoms": [], "topics": []},
  "sources": ["ClinicalTrials", "WHO"],
  "analysis_required": false
}"#;

/// Pops scripted replies in order and records every prompt it receives.
pub struct MockLlmProvider {
    responses: Mutex<Vec<LlmResult<LlmResponse>>>,
    prompts: Mutex<Vec<String>>,
    config: ProviderConfig,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<LlmResult<LlmResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
            config: ProviderConfig::default(),
        }
    }

    pub fn with_texts(texts: &[&str]) -> Self {
        Self::new(
            texts
                .iter()
                .map(|t| Ok(LlmResponse::text(*t)))
                .collect(),
        )
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        _system: Option<String>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        self.prompts
            .lock()
            .unwrap()
            .push(messages.last().map(|m| m.content.clone()).unwrap_or_default());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(LlmError::Other {
                message: "No more mock responses available".to_string(),
            })
        } else {
            responses.remove(0)
        }
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Returns fixed records (or a failure) and counts its calls.
pub struct CountingClient {
    source: Source,
    records: Option<SourceRecords>,
    calls: AtomicUsize,
    targets: Mutex<Vec<FetchTarget>>,
}

impl CountingClient {
    pub fn returning(records: SourceRecords) -> Arc<Self> {
        Arc::new(Self {
            source: records.source(),
            records: Some(records),
            calls: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(source: Source) -> Arc<Self> {
        Arc::new(Self {
            source,
            records: None,
            calls: AtomicUsize::new(0),
            targets: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn targets(&self) -> Vec<FetchTarget> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceClient for CountingClient {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(&self, target: &FetchTarget, _limit: usize) -> Result<SourceRecords, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(target.clone());
        match &self.records {
            Some(records) => Ok(records.clone()),
            None => Err(FetchError::Status {
                origin: self.source,
                status: 503,
            }),
        }
    }
}
