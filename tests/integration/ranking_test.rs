//! Ranking Integration Tests
//!
//! Sub-score bands, composite bounds and sort stability.

use carewise::services::evidence::{rank, rank_at, source_priority};
use carewise_core::{Entities, EvidenceItem, ExecutionPlan, Intent, Source};
use serde_json::json;

const YEAR: i32 = 2025;

fn plan(intent: Intent, entities: Entities) -> ExecutionPlan {
    ExecutionPlan {
        intent,
        sources: intent.allowed_sources().to_vec(),
        entities,
        analysis_required: false,
    }
}

fn melanoma_car_t() -> Entities {
    Entities {
        diseases: vec!["melanoma".to_string()],
        therapies: vec!["CAR-T".to_string()],
        ..Default::default()
    }
}

fn breakdown(item: &EvidenceItem) -> carewise_core::ScoreBreakdown {
    item.scores_breakdown.expect("ranked item carries a breakdown")
}

fn rank_one(item: EvidenceItem, plan: &ExecutionPlan) -> EvidenceItem {
    rank_at(vec![item], plan, YEAR).remove(0)
}

// ============================================================================
// Sub-scores
// ============================================================================

#[test]
fn test_clinical_trials_source_priority() {
    let p = plan(Intent::ClinicalTrials, melanoma_car_t());
    assert_eq!(source_priority(p.intent, Source::ClinicalTrials), 1.0);
    assert_eq!(source_priority(p.intent, Source::PubMed), 0.8);
    assert_eq!(source_priority(p.intent, Source::Fda), 0.3);

    let ranked = rank_one(EvidenceItem::new("t", "t", "c", Source::ClinicalTrials), &p);
    assert_eq!(breakdown(&ranked).source_priority, 1.0);
}

#[test]
fn test_relevance_counts_entities() {
    let p = plan(Intent::ClinicalTrials, melanoma_car_t());

    let both = rank_one(
        EvidenceItem::new("1", "CAR-T for Melanoma", "Phase 2 results", Source::PubMed),
        &p,
    );
    let one = rank_one(
        EvidenceItem::new("2", "Melanoma staging", "Surgical outcomes", Source::PubMed),
        &p,
    );
    let neither = rank_one(
        EvidenceItem::new("3", "Asthma inhalers", "Dosing", Source::PubMed),
        &p,
    );

    assert_eq!(breakdown(&both).relevance, 1.0);
    assert_eq!(breakdown(&one).relevance, 0.5);
    assert_eq!(breakdown(&neither).relevance, 0.0);
}

#[test]
fn test_relevance_neutral_without_entities() {
    let p = plan(Intent::GeneralHealth, Entities::default());
    let ranked = rank_one(EvidenceItem::new("c", "Flu", "Shots", Source::Cdc), &p);
    assert_eq!(breakdown(&ranked).relevance, 0.5);
}

#[test]
fn test_recency_bands() {
    let p = plan(Intent::LiteratureReview, melanoma_car_t());
    let with_year = |year: serde_json::Value| {
        rank_one(
            EvidenceItem::new("p", "t", "c", Source::PubMed).with_metadata("year", year),
            &p,
        )
    };

    assert_eq!(breakdown(&with_year(json!(YEAR - 1))).recency, 1.0);
    assert_eq!(breakdown(&with_year(json!((YEAR - 4).to_string()))).recency, 0.6);
    assert_eq!(breakdown(&with_year(json!(null))).recency, 0.5);

    let no_year = rank_one(EvidenceItem::new("p", "t", "c", Source::PubMed), &p);
    assert_eq!(breakdown(&no_year).recency, 0.5);
}

#[test]
fn test_completeness_bands() {
    let p = plan(Intent::LiteratureReview, melanoma_car_t());
    let long = rank_one(
        EvidenceItem::new("p", "t", "a".repeat(600), Source::PubMed),
        &p,
    );
    let placeholder = rank_one(
        EvidenceItem::new("p", "t", "No abstract available", Source::PubMed),
        &p,
    );
    assert_eq!(breakdown(&long).completeness, 1.0);
    assert_eq!(breakdown(&placeholder).completeness, 0.3);
}

// ============================================================================
// Composite and ordering
// ============================================================================

#[test]
fn test_scores_stay_in_unit_interval() {
    let p = plan(Intent::DrugSafety, Entities {
        drugs: vec!["ibuprofen".to_string()],
        ..Default::default()
    });
    let evidence = vec![
        EvidenceItem::new("a", "ibuprofen", "ibuprofen ".repeat(80), Source::Fda)
            .with_metadata("year", YEAR + 3),
        EvidenceItem::new("b", "", "", Source::ClinicalTrials).with_metadata("year", 1900),
        EvidenceItem::new("c", "x", "No content", Source::PubMed)
            .with_metadata("year", "garbage"),
    ];
    for item in rank_at(evidence, &p, YEAR) {
        let score = item.score.unwrap();
        assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }
}

#[test]
fn test_top_item_matches_expected_composite() {
    let p = plan(Intent::ClinicalTrials, melanoma_car_t());
    let item = EvidenceItem::new("t", "CAR-T melanoma", "a".repeat(600), Source::ClinicalTrials)
        .with_metadata("year", YEAR);
    let ranked = rank_one(item, &p);
    // 0.4 * 1.0 + 0.3 * 1.0 + 0.2 * 1.0 + 0.1 * 1.0
    assert!((ranked.score.unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn test_ties_keep_input_order() {
    let p = plan(Intent::GeneralHealth, Entities::default());
    let evidence: Vec<EvidenceItem> = (0..6)
        .map(|i| EvidenceItem::new(format!("cdc-{}", i), "Same", "Same body", Source::Cdc))
        .collect();

    let ranked = rank_at(evidence, &p, YEAR);
    let ids: Vec<&str> = ranked.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["cdc-0", "cdc-1", "cdc-2", "cdc-3", "cdc-4", "cdc-5"]);
}

#[test]
fn test_rank_is_deterministic() {
    let p = plan(Intent::ClinicalTrials, melanoma_car_t());
    let evidence = vec![
        EvidenceItem::new("a", "melanoma", "short", Source::PubMed),
        EvidenceItem::new("b", "CAR-T", "a".repeat(300), Source::ClinicalTrials),
        EvidenceItem::new("c", "label", "No content", Source::Fda),
        EvidenceItem::new("d", "melanoma", "short", Source::PubMed),
    ];

    let first = rank_at(evidence.clone(), &p, YEAR);
    let second = rank_at(evidence, &p, YEAR);
    assert_eq!(first, second);

    let ids: Vec<&str> = first.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "d", "c"]);
}

#[test]
fn test_rank_uses_current_year() {
    let p = plan(Intent::LiteratureReview, melanoma_car_t());
    let ranked = rank(vec![EvidenceItem::new("p", "t", "c", Source::PubMed)], &p);
    assert_eq!(breakdown(&ranked[0]).recency, 0.5);
}
