//! Schema Registries
//!
//! Static registries of the intents a plan may declare and the evidence
//! sources it may query, plus the intent-group rules binding the two.
//!
//! Intents fall into two disjoint groups. A plan whose intent belongs to one
//! group may only name sources from that same group.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Intent Registry
// ============================================================================

/// Classification of a query's purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    LiteratureReview,
    ClinicalTrials,
    DrugSafety,
    ComparativeResearch,
    DataAnalysis,
    SymptomsRelated,
    Informational,
    GeneralHealth,
}

impl Intent {
    /// Every registered intent, biomedical group first.
    pub const ALL: [Intent; 8] = [
        Intent::LiteratureReview,
        Intent::ClinicalTrials,
        Intent::DrugSafety,
        Intent::ComparativeResearch,
        Intent::DataAnalysis,
        Intent::SymptomsRelated,
        Intent::Informational,
        Intent::GeneralHealth,
    ];

    /// Wire name used in plans and prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::LiteratureReview => "LITERATURE_REVIEW",
            Intent::ClinicalTrials => "CLINICAL_TRIALS",
            Intent::DrugSafety => "DRUG_SAFETY",
            Intent::ComparativeResearch => "COMPARATIVE_RESEARCH",
            Intent::DataAnalysis => "DATA_ANALYSIS",
            Intent::SymptomsRelated => "SYMPTOMS_RELATED",
            Intent::Informational => "INFORMATIONAL",
            Intent::GeneralHealth => "GENERAL_HEALTH",
        }
    }

    /// The group this intent belongs to.
    pub fn group(&self) -> IntentGroup {
        match self {
            Intent::LiteratureReview
            | Intent::ClinicalTrials
            | Intent::DrugSafety
            | Intent::ComparativeResearch
            | Intent::DataAnalysis => IntentGroup::Biomedical,
            Intent::SymptomsRelated | Intent::Informational | Intent::GeneralHealth => {
                IntentGroup::GeneralHealth
            }
        }
    }

    /// Sources a plan with this intent is permitted to name.
    pub fn allowed_sources(&self) -> &'static [Source] {
        self.group().sources()
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| CoreError::parse(format!("unknown intent: {s}")))
    }
}

// ============================================================================
// Intent Groups
// ============================================================================

/// Disjoint intent groups; each owns a disjoint set of sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentGroup {
    Biomedical,
    GeneralHealth,
}

impl IntentGroup {
    /// Sources owned by this group, in registry order.
    pub fn sources(&self) -> &'static [Source] {
        match self {
            IntentGroup::Biomedical => &BIOMEDICAL_SOURCES,
            IntentGroup::GeneralHealth => &GENERAL_HEALTH_SOURCES,
        }
    }

    /// Label used in validator messages.
    pub fn label(&self) -> &'static str {
        match self {
            IntentGroup::Biomedical => "Biomedical",
            IntentGroup::GeneralHealth => "General health",
        }
    }

    /// What the *other* group's sources are called, for error messages.
    pub fn foreign_sources_label(&self) -> &'static str {
        match self {
            IntentGroup::Biomedical => "general health sources",
            IntentGroup::GeneralHealth => "biomedical sources",
        }
    }
}

// ============================================================================
// Source Registry
// ============================================================================

/// An external evidence provider.
///
/// Declaration order is the canonical source-group order used when
/// normalized evidence is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "PubMed")]
    PubMed,
    #[serde(rename = "ClinicalTrials")]
    ClinicalTrials,
    #[serde(rename = "FDA")]
    Fda,
    #[serde(rename = "MedlinePlus")]
    MedlinePlus,
    #[serde(rename = "CDC")]
    Cdc,
    #[serde(rename = "WHO")]
    Who,
}

/// Sources owned by the biomedical intent group.
pub const BIOMEDICAL_SOURCES: [Source; 3] = [Source::PubMed, Source::ClinicalTrials, Source::Fda];

/// Sources owned by the general-health intent group.
pub const GENERAL_HEALTH_SOURCES: [Source; 3] = [Source::MedlinePlus, Source::Cdc, Source::Who];

impl Source {
    /// Every registered source in canonical order.
    pub const ALL: [Source; 6] = [
        Source::PubMed,
        Source::ClinicalTrials,
        Source::Fda,
        Source::MedlinePlus,
        Source::Cdc,
        Source::Who,
    ];

    /// Wire name used in plans, prompts and citations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PubMed => "PubMed",
            Source::ClinicalTrials => "ClinicalTrials",
            Source::Fda => "FDA",
            Source::MedlinePlus => "MedlinePlus",
            Source::Cdc => "CDC",
            Source::Who => "WHO",
        }
    }

    /// The intent group that owns this source.
    pub fn group(&self) -> IntentGroup {
        if BIOMEDICAL_SOURCES.contains(self) {
            IntentGroup::Biomedical
        } else {
            IntentGroup::GeneralHealth
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| CoreError::parse(format!("unknown source: {s}")))
    }
}

/// Render a list of registry names as `[A, B, C]`.
pub fn format_names<T: std::fmt::Display>(items: &[T]) -> String {
    let names: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    format!("[{}]", names.join(", "))
}
