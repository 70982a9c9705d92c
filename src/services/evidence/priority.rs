//! Source Priority Table
//!
//! Static (intent, source) weights used by the ranker. Pairs without a row
//! fall back to [`DEFAULT_PRIORITY`].

use std::collections::HashSet;

use carewise_core::{CoreError, Intent, Source};

/// Weight for pairs the table does not list.
pub const DEFAULT_PRIORITY: f64 = 0.5;

// ============================================================================
// Table
// ============================================================================

#[rustfmt::skip]
const PRIORITY_TABLE: &[(Intent, Source, f64)] = &[
    (Intent::ClinicalTrials, Source::ClinicalTrials, 1.0),
    (Intent::ClinicalTrials, Source::PubMed, 0.8),
    (Intent::ClinicalTrials, Source::Fda, 0.3),
    (Intent::ClinicalTrials, Source::MedlinePlus, 0.5),
    (Intent::ClinicalTrials, Source::Cdc, 0.4),
    (Intent::ClinicalTrials, Source::Who, 0.3),

    (Intent::DrugSafety, Source::Fda, 1.0),
    (Intent::DrugSafety, Source::PubMed, 0.6),
    (Intent::DrugSafety, Source::MedlinePlus, 0.8),
    (Intent::DrugSafety, Source::ClinicalTrials, 0.4),
    (Intent::DrugSafety, Source::Cdc, 0.5),
    (Intent::DrugSafety, Source::Who, 0.3),

    (Intent::LiteratureReview, Source::PubMed, 1.0),
    (Intent::LiteratureReview, Source::ClinicalTrials, 0.5),
    (Intent::LiteratureReview, Source::Fda, 0.3),
    (Intent::LiteratureReview, Source::MedlinePlus, 0.4),
    (Intent::LiteratureReview, Source::Cdc, 0.4),
    (Intent::LiteratureReview, Source::Who, 0.5),

    (Intent::ComparativeResearch, Source::PubMed, 1.0),
    (Intent::ComparativeResearch, Source::ClinicalTrials, 0.8),
    (Intent::ComparativeResearch, Source::Fda, 0.6),
    (Intent::ComparativeResearch, Source::MedlinePlus, 0.5),
    (Intent::ComparativeResearch, Source::Cdc, 0.5),
    (Intent::ComparativeResearch, Source::Who, 0.6),

    (Intent::DataAnalysis, Source::PubMed, 1.0),
    (Intent::DataAnalysis, Source::Who, 0.9),
    (Intent::DataAnalysis, Source::Cdc, 0.8),
    (Intent::DataAnalysis, Source::ClinicalTrials, 0.7),
    (Intent::DataAnalysis, Source::Fda, 0.5),
    (Intent::DataAnalysis, Source::MedlinePlus, 0.4),

    (Intent::SymptomsRelated, Source::MedlinePlus, 1.0),
    (Intent::SymptomsRelated, Source::Cdc, 0.8),
    (Intent::SymptomsRelated, Source::PubMed, 0.6),
    (Intent::SymptomsRelated, Source::Who, 0.5),
    (Intent::SymptomsRelated, Source::Fda, 0.4),
    (Intent::SymptomsRelated, Source::ClinicalTrials, 0.3),

    (Intent::Informational, Source::MedlinePlus, 1.0),
    (Intent::Informational, Source::Cdc, 0.9),
    (Intent::Informational, Source::Who, 0.8),
    (Intent::Informational, Source::PubMed, 0.7),
    (Intent::Informational, Source::Fda, 0.5),
    (Intent::Informational, Source::ClinicalTrials, 0.4),

    (Intent::GeneralHealth, Source::Cdc, 1.0),
    (Intent::GeneralHealth, Source::Who, 0.9),
    (Intent::GeneralHealth, Source::MedlinePlus, 0.8),
    (Intent::GeneralHealth, Source::PubMed, 0.5),
    (Intent::GeneralHealth, Source::Fda, 0.3),
    (Intent::GeneralHealth, Source::ClinicalTrials, 0.3),
];

fn lookup(rows: &[(Intent, Source, f64)], intent: Intent, source: Source) -> Option<f64> {
    rows.iter()
        .find(|(i, s, _)| *i == intent && *s == source)
        .map(|(_, _, weight)| *weight)
}

/// Weight of `source` for a plan with `intent`.
pub fn source_priority(intent: Intent, source: Source) -> f64 {
    lookup(PRIORITY_TABLE, intent, source).unwrap_or(DEFAULT_PRIORITY)
}

// ============================================================================
// Startup validation
// ============================================================================

/// Check a priority table and list the allowed pairs it leaves defaulted.
fn check_table(rows: &[(Intent, Source, f64)]) -> Result<Vec<(Intent, Source)>, CoreError> {
    let mut seen = HashSet::new();
    for (intent, source, weight) in rows {
        if !(0.0..=1.0).contains(weight) {
            return Err(CoreError::config(format!(
                "Priority for ({}, {}) is {}, outside [0, 1]",
                intent, source, weight
            )));
        }
        if !seen.insert((*intent, *source)) {
            return Err(CoreError::config(format!(
                "Duplicate priority row for ({}, {})",
                intent, source
            )));
        }
    }

    Ok(Intent::ALL
        .iter()
        .flat_map(|intent| {
            intent
                .allowed_sources()
                .iter()
                .map(move |source| (*intent, *source))
        })
        .filter(|(intent, source)| !seen.contains(&(*intent, *source)))
        .collect())
}

/// Validate the built-in table.
///
/// Returns the (intent, allowed source) pairs that use the default weight,
/// logging each one.
pub fn validate_priority_table() -> Result<Vec<(Intent, Source)>, CoreError> {
    let defaulted = check_table(PRIORITY_TABLE)?;
    for (intent, source) in &defaulted {
        tracing::info!(
            intent = %intent,
            source = %source,
            weight = DEFAULT_PRIORITY,
            "Source priority falls back to default"
        );
    }
    tracing::debug!(rows = PRIORITY_TABLE.len(), "Source priority table validated");
    Ok(defaulted)
}
