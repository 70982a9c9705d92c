//! Evidence Ranker
//!
//! Scores each evidence item against the plan on four factors and sorts the
//! list by the weighted composite, highest first. Ties keep their input order.

use std::collections::HashSet;

use chrono::{Datelike, Utc};
use serde_json::Value;

use carewise_core::{is_placeholder_content, EvidenceItem, ExecutionPlan, ScoreBreakdown};

use super::priority::source_priority;

pub const RELEVANCE_WEIGHT: f64 = 0.4;
pub const SOURCE_PRIORITY_WEIGHT: f64 = 0.3;
pub const COMPLETENESS_WEIGHT: f64 = 0.2;
pub const RECENCY_WEIGHT: f64 = 0.1;

/// Score used when a factor cannot be judged.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Completeness of placeholder or empty content.
pub const EMPTY_CONTENT_SCORE: f64 = 0.3;

/// Lowercased query entities, deduplicated, blanks dropped.
pub fn entity_terms(plan: &ExecutionPlan) -> Vec<String> {
    let mut seen = HashSet::new();
    plan.entities
        .iter_all()
        .filter(|e| !e.trim().is_empty())
        .map(|e| e.to_lowercase())
        .filter(|e| seen.insert(e.clone()))
        .collect()
}

/// Share of entity terms found in the item's title and content.
pub fn relevance_score(item: &EvidenceItem, terms: &[String]) -> f64 {
    if terms.is_empty() {
        return NEUTRAL_SCORE;
    }
    let text = format!("{} {}", item.title, item.content).to_lowercase();
    let matches = terms.iter().filter(|t| text.contains(t.as_str())).count();
    (matches as f64 / terms.len() as f64).min(1.0)
}

/// Integer year from a metadata value (number or numeric string).
pub fn parse_year(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn recency_score(item: &EvidenceItem, current_year: i32) -> f64 {
    let Some(year) = item.metadata.get("year").and_then(parse_year) else {
        return NEUTRAL_SCORE;
    };
    match i64::from(current_year) - year {
        age if age <= 1 => 1.0,
        age if age <= 3 => 0.8,
        age if age <= 5 => 0.6,
        _ => 0.4,
    }
}

pub fn completeness_score(item: &EvidenceItem) -> f64 {
    if is_placeholder_content(&item.content) {
        return EMPTY_CONTENT_SCORE;
    }
    match item.content.chars().count() {
        n if n > 500 => 1.0,
        n if n > 200 => 0.8,
        n if n > 50 => 0.6,
        _ => 0.4,
    }
}

/// All four sub-scores, each clamped to [0, 1].
pub fn score_breakdown(
    item: &EvidenceItem,
    plan: &ExecutionPlan,
    terms: &[String],
    current_year: i32,
) -> ScoreBreakdown {
    ScoreBreakdown {
        relevance: relevance_score(item, terms).clamp(0.0, 1.0),
        recency: recency_score(item, current_year).clamp(0.0, 1.0),
        completeness: completeness_score(item).clamp(0.0, 1.0),
        source_priority: source_priority(plan.intent, item.source).clamp(0.0, 1.0),
    }
}

pub fn composite_score(breakdown: &ScoreBreakdown) -> f64 {
    let score = breakdown.relevance * RELEVANCE_WEIGHT
        + breakdown.source_priority * SOURCE_PRIORITY_WEIGHT
        + breakdown.completeness * COMPLETENESS_WEIGHT
        + breakdown.recency * RECENCY_WEIGHT;
    score.clamp(0.0, 1.0)
}

/// Rank `evidence` for `plan` as of `current_year`.
pub fn rank_at(
    mut evidence: Vec<EvidenceItem>,
    plan: &ExecutionPlan,
    current_year: i32,
) -> Vec<EvidenceItem> {
    let terms = entity_terms(plan);

    for item in evidence.iter_mut() {
        let breakdown = score_breakdown(item, plan, &terms, current_year);
        item.score = Some(composite_score(&breakdown));
        item.scores_breakdown = Some(breakdown);
    }

    // slice::sort_by is stable
    evidence.sort_by(|a, b| b.score_or_zero().total_cmp(&a.score_or_zero()));

    if let Some(top) = evidence.first() {
        tracing::info!(
            count = evidence.len(),
            terms = terms.len(),
            top_id = %top.id,
            top_score = top.score_or_zero(),
            "Evidence ranked"
        );
    }
    evidence
}

/// Rank `evidence` for `plan` using the current UTC year.
pub fn rank(evidence: Vec<EvidenceItem>, plan: &ExecutionPlan) -> Vec<EvidenceItem> {
    rank_at(evidence, plan, Utc::now().year())
}
