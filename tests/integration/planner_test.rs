//! Planner Integration Tests
//!
//! The self-healing loop driven end to end through a scripted provider.

use std::sync::Arc;

use carewise::services::planning::{
    build_planner_prompt, schema_correction, PlannerError, QueryPlanner, INVALID_JSON_CORRECTION,
    MAX_RETRIES,
};
use carewise::services::sources::SourceRegistry;
use carewise::services::Pipeline;
use carewise::models::SourceLimits;
use carewise::AppError;
use carewise_core::{Intent, Source};
use carewise_llm::LlmError;

use super::support::{CountingClient, MockLlmProvider, MIXED_GROUP_PLAN, VALID_TRIALS_PLAN};

const QUERY: &str = "Are there CAR-T trials for melanoma?";

// ============================================================================
// Repair loop
// ============================================================================

#[tokio::test]
async fn test_heals_parse_then_schema_error() {
    let provider = Arc::new(MockLlmProvider::with_texts(&[
        "Sure, let me think about that...",
        MIXED_GROUP_PLAN,
        VALID_TRIALS_PLAN,
    ]));
    let planner = QueryPlanner::new(provider.clone(), MAX_RETRIES);

    let plan = planner.plan(QUERY).await.unwrap();
    assert_eq!(plan.intent, Intent::ClinicalTrials);
    assert_eq!(plan.sources, vec![Source::ClinicalTrials, Source::PubMed]);
    assert_eq!(plan.entities.therapies, vec!["CAR-T"]);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 3);

    let base = build_planner_prompt(QUERY);
    assert_eq!(prompts[0], base);
    assert_eq!(prompts[1], format!("{}{}", base, INVALID_JSON_CORRECTION));

    // Third prompt carries both corrections, parse error first.
    let third = &prompts[2];
    assert!(third.starts_with(&prompts[1]));
    let parse_at = third.find(INVALID_JSON_CORRECTION).unwrap();
    let schema_at = third.find("\n\nERROR: ").unwrap();
    assert!(parse_at < schema_at);
    assert!(third.contains("WHO"));
    assert!(third.ends_with("Fix the JSON. Output ONLY valid JSON."));
}

#[tokio::test]
async fn test_schema_correction_embeds_validator_error() {
    let provider = Arc::new(MockLlmProvider::with_texts(&[MIXED_GROUP_PLAN, VALID_TRIALS_PLAN]));
    let planner = QueryPlanner::new(provider.clone(), MAX_RETRIES);
    planner.plan(QUERY).await.unwrap();

    let (ok, error) = carewise_core::validate(&serde_json::from_str(MIXED_GROUP_PLAN).unwrap());
    assert!(!ok);
    let prompts = provider.prompts();
    assert!(prompts[1].ends_with(&schema_correction(&error)));
}

#[tokio::test]
async fn test_first_valid_reply_needs_one_call() {
    let provider = Arc::new(MockLlmProvider::with_texts(&[VALID_TRIALS_PLAN]));
    let planner = QueryPlanner::new(provider.clone(), MAX_RETRIES);
    planner.plan(QUERY).await.unwrap();
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_fenced_reply_is_accepted() {
    let fenced = format!("Here you go:\n```json\n{}\n```", VALID_TRIALS_PLAN);
    let provider = Arc::new(MockLlmProvider::with_texts(&[fenced.as_str()]));
    let planner = QueryPlanner::new(provider.clone(), MAX_RETRIES);
    assert!(planner.plan(QUERY).await.is_ok());
}

// ============================================================================
// Failure paths
// ============================================================================

#[tokio::test]
async fn test_exhaustion_reports_last_error() {
    let provider = Arc::new(MockLlmProvider::with_texts(&[
        "not json",
        "still not json",
        MIXED_GROUP_PLAN,
    ]));
    let planner = QueryPlanner::new(provider.clone(), MAX_RETRIES);

    match planner.plan(QUERY).await {
        Err(PlannerError::RetriesExhausted {
            attempts,
            last_error,
        }) => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("WHO"));
        }
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_exhaustion_never_fetches() {
    let provider = Arc::new(MockLlmProvider::with_texts(&["a", "b", "c"]));
    let trials = CountingClient::failing(Source::ClinicalTrials);
    let pubmed = CountingClient::failing(Source::PubMed);

    let mut registry = SourceRegistry::new();
    registry.register(trials.clone());
    registry.register(pubmed.clone());
    let pipeline = Pipeline::new(
        QueryPlanner::new(provider, MAX_RETRIES),
        registry,
        SourceLimits::default(),
    );

    let err = pipeline.run(QUERY).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Planner(PlannerError::RetriesExhausted { attempts: 3, .. })
    ));
    assert_eq!(trials.calls(), 0);
    assert_eq!(pubmed.calls(), 0);
}

#[tokio::test]
async fn test_generator_failure_is_not_retried() {
    let provider = Arc::new(MockLlmProvider::new(vec![
        Err(LlmError::ProviderUnavailable {
            message: "connection refused".to_string(),
        }),
        Ok(carewise_llm::LlmResponse::text(VALID_TRIALS_PLAN)),
    ]));
    let planner = QueryPlanner::new(provider.clone(), MAX_RETRIES);

    let err = planner.plan(QUERY).await.unwrap_err();
    match err {
        PlannerError::GeneratorUnavailable(e) => assert!(e.is_connectivity()),
        other => panic!("expected GeneratorUnavailable, got {:?}", other),
    }
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_retry_bound_is_configurable() {
    let provider = Arc::new(MockLlmProvider::with_texts(&["x", "y", "z", "w", "v"]));
    let planner = QueryPlanner::new(provider.clone(), 5);
    assert!(planner.plan(QUERY).await.is_err());
    assert_eq!(provider.calls(), 5);
}
