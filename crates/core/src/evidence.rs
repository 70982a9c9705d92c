//! Evidence Items
//!
//! Canonical evidence record shared by the normalizer, the ranker and the
//! answer stage. `score` and `scores_breakdown` stay empty until ranking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::Source;

/// Placeholder for a missing title.
pub const NO_TITLE: &str = "No title";
/// Placeholder for a PubMed record without an abstract.
pub const NO_ABSTRACT: &str = "No abstract available";
/// Placeholder for a MedlinePlus topic without a summary.
pub const NO_SUMMARY: &str = "No summary available";
/// Placeholder for a CDC record without a description.
pub const NO_DESCRIPTION: &str = "No description available";
/// Generic empty-content marker.
pub const NO_CONTENT: &str = "No content";
/// Placeholder for an absent structured section.
pub const NOT_SPECIFIED: &str = "Not specified";
/// Placeholder for an absent structured value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Content strings the ranker treats as empty.
pub const EMPTY_CONTENT_PLACEHOLDERS: [&str; 4] = [NO_ABSTRACT, NO_CONTENT, NO_SUMMARY, NO_DESCRIPTION];

/// Whether a content string carries no real text.
pub fn is_placeholder_content(content: &str) -> bool {
    content.is_empty() || EMPTY_CONTENT_PLACEHOLDERS.contains(&content)
}

/// The four sub-scores behind a composite score, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub relevance: f64,
    pub recency: f64,
    pub completeness: f64,
    pub source_priority: f64,
}

/// One canonicalized piece of evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub source: Source,
    /// Source-specific auxiliary fields (`year`, `status`, `indicator`, ...)
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scores_breakdown: Option<ScoreBreakdown>,
}

impl EvidenceItem {
    /// Create an unranked item with empty metadata.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        source: Source,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            source,
            metadata: BTreeMap::new(),
            score: None,
            scores_breakdown: None,
        }
    }

    /// Builder-style metadata insertion.
    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Composite score, or 0.0 before ranking.
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}
