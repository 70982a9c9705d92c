//! Pipeline Integration Tests
//!
//! Plan → route → fetch → normalize → rank → answer with scripted doubles in
//! place of the generator and the evidence sources.

use std::sync::Arc;

use carewise::models::SourceLimits;
use carewise::services::planning::{QueryPlanner, MAX_RETRIES};
use carewise::services::sources::{
    CdcRecord, FetchTarget, HealthTopic, SourceRecords, SourceRegistry, TrialRecord,
};
use carewise::services::{AnswerGenerator, Pipeline};
use carewise_core::Source;

use super::support::{CountingClient, MockLlmProvider, VALID_TRIALS_PLAN};

const DRUG_SAFETY_NO_DRUG: &str = r#"{
  "intent": "DRUG_SAFETY",
  "entities": {"diseases": ["hypertension"], "drugs": [], "therapies": [], "symptoms": [], "topics": []},
  "sources": ["FDA", "PubMed"],
  "analysis_required": false
}"#;

const GENERAL_HEALTH_PLAN: &str = r#"{
  "intent": "GENERAL_HEALTH",
  "entities": {"diseases": ["Diabetes"], "drugs": [], "therapies": [], "symptoms": [], "topics": ["sleep"]},
  "sources": ["CDC", "WHO", "MedlinePlus"],
  "analysis_required": false
}"#;

fn trials() -> SourceRecords {
    SourceRecords::ClinicalTrials(vec![
        TrialRecord {
            nct_id: Some("NCT00000001".to_string()),
            title: Some("Observational registry".to_string()),
            conditions: vec!["Skin Cancer".to_string()],
            phases: vec![],
            status: Some("COMPLETED".to_string()),
        },
        TrialRecord {
            nct_id: Some("NCT00000002".to_string()),
            title: Some("CAR-T cells for metastatic melanoma".to_string()),
            conditions: vec!["Melanoma".to_string()],
            phases: vec!["PHASE2".to_string()],
            status: Some("RECRUITING".to_string()),
        },
    ])
}

fn pipeline(provider: Arc<MockLlmProvider>, registry: SourceRegistry) -> Pipeline {
    Pipeline::new(
        QueryPlanner::new(provider, MAX_RETRIES),
        registry,
        SourceLimits::default(),
    )
}

#[tokio::test]
async fn test_failing_source_does_not_abort_run() {
    let provider = Arc::new(MockLlmProvider::with_texts(&[VALID_TRIALS_PLAN]));
    let trials_client = CountingClient::returning(trials());
    let pubmed_client = CountingClient::failing(Source::PubMed);

    let mut registry = SourceRegistry::new();
    registry.register(trials_client.clone());
    registry.register(pubmed_client.clone());

    let report = pipeline(provider, registry).run("CAR-T for melanoma?").await.unwrap();

    assert_eq!(trials_client.calls(), 1);
    assert_eq!(pubmed_client.calls(), 1);
    assert_eq!(
        trials_client.targets(),
        vec![FetchTarget::Search {
            term: "melanoma CAR-T".to_string()
        }]
    );

    assert_eq!(report.evidence.len(), 2);
    assert!(report.evidence.iter().all(|e| e.source == Source::ClinicalTrials));
    assert_eq!(report.evidence[0].id, "NCT00000002");
    assert!(report.evidence[0].score_or_zero() >= report.evidence[1].score_or_zero());
    assert!(report.answer.is_none());
}

#[tokio::test]
async fn test_fda_skipped_without_drug() {
    let provider = Arc::new(MockLlmProvider::with_texts(&[DRUG_SAFETY_NO_DRUG]));
    let fda = CountingClient::failing(Source::Fda);
    let pubmed = CountingClient::returning(SourceRecords::PubMed(vec![]));

    let mut registry = SourceRegistry::new();
    registry.register(fda.clone());
    registry.register(pubmed.clone());

    let report = pipeline(provider, registry).run("Is it safe?").await.unwrap();
    assert_eq!(fda.calls(), 0);
    assert_eq!(pubmed.calls(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].source, Source::Fda);
    assert!(report.evidence.is_empty());
}

#[tokio::test]
async fn test_who_requests_follow_indicator_table() {
    let provider = Arc::new(MockLlmProvider::with_texts(&[GENERAL_HEALTH_PLAN]));
    let who = CountingClient::returning(SourceRecords::Who(vec![]));
    let cdc = CountingClient::returning(SourceRecords::Cdc(vec![CdcRecord {
        title: Some("Diabetes Surveillance".to_string()),
        description: Some("<p>National diabetes statistics.</p>".to_string()),
    }]));

    let mut registry = SourceRegistry::new();
    registry.register(who.clone());
    registry.register(cdc.clone());
    // No MedlinePlus client registered.

    let report = pipeline(provider, registry).run("diabetes and sleep").await.unwrap();

    assert_eq!(
        who.targets(),
        vec![FetchTarget::Indicator {
            topic: "Diabetes".to_string(),
            indicator: "NCD_GLUC_04",
        }]
    );
    assert!(report
        .skipped
        .iter()
        .any(|s| s.source == Source::Who && s.reason.contains("sleep")));

    assert_eq!(report.evidence.len(), 1);
    assert_eq!(report.evidence[0].id, "CDC-Diabetes Surveillanc");
    assert_eq!(report.evidence[0].content, "National diabetes statistics.");
}

#[tokio::test]
async fn test_answer_stage_cites_ranked_sources() {
    let provider = Arc::new(MockLlmProvider::with_texts(&[
        VALID_TRIALS_PLAN,
        "A phase 2 CAR-T trial is recruiting [ClinicalTrials].",
    ]));
    let mut registry = SourceRegistry::new();
    registry.register(CountingClient::returning(trials()));
    registry.register(CountingClient::returning(SourceRecords::PubMed(vec![])));

    let pipeline = pipeline(provider.clone(), registry)
        .with_answer(AnswerGenerator::new(provider.clone(), 1));
    let report = pipeline.run("CAR-T for melanoma?").await.unwrap();

    let answer = report.answer.unwrap();
    assert_eq!(answer.evidence_count, 1);
    assert_eq!(answer.sources_used.len(), 1);
    assert_eq!(answer.sources_used[0].id, "NCT00000002");

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("[Evidence 1] Source: ClinicalTrials"));
    assert!(!prompts[1].contains("[Evidence 2]"));
}

#[tokio::test]
async fn test_fetch_groups_results_by_source() {
    let provider = Arc::new(MockLlmProvider::with_texts(&[]));
    let medline = CountingClient::returning(SourceRecords::MedlinePlus(vec![HealthTopic {
        title: Some("Sleep Disorders".to_string()),
        summary: None,
    }]));
    let mut registry = SourceRegistry::new();
    registry.register(medline);
    let pipeline = pipeline(provider, registry);

    let plan: carewise_core::ExecutionPlan =
        carewise_core::validate_plan(&serde_json::from_str(GENERAL_HEALTH_PLAN).unwrap()).unwrap();
    let routing = carewise::services::sources::route_plan(&plan);
    let raw = pipeline.fetch(&plan, &routing.requests).await;

    for source in &plan.sources {
        assert!(raw.get(*source).is_some(), "missing entry for {}", source);
    }
    assert_eq!(raw.get(Source::MedlinePlus).map(SourceRecords::len), Some(1));
    assert_eq!(raw.total(), 1);
}
