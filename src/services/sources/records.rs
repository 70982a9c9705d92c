//! Raw Source Records
//!
//! Source-specific records as returned by the fetch clients, before
//! normalization. Fields the upstream service may omit are `Option`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use carewise_core::Source;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PubMedArticle {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    /// `PubDate/Year` as published, usually four digits.
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub nct_id: Option<String>,
    pub title: Option<String>,
    pub conditions: Vec<String>,
    pub phases: Vec<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrugLabel {
    /// Drug name the label was searched for.
    pub drug: String,
    pub purpose: Option<String>,
    pub warnings: Option<String>,
    pub adverse_reactions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthTopic {
    pub title: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdcRecord {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// One WHO GHO data point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhoObservation {
    pub indicator: String,
    /// Topic or disease the indicator was looked up for.
    pub topic: String,
    pub country: Option<String>,
    pub year: Option<Value>,
    pub value: Option<Value>,
}

/// Records from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "records")]
pub enum SourceRecords {
    PubMed(Vec<PubMedArticle>),
    ClinicalTrials(Vec<TrialRecord>),
    Fda(Vec<DrugLabel>),
    MedlinePlus(Vec<HealthTopic>),
    Cdc(Vec<CdcRecord>),
    Who(Vec<WhoObservation>),
}

impl SourceRecords {
    /// An empty record list for `source`.
    pub fn empty(source: Source) -> Self {
        match source {
            Source::PubMed => SourceRecords::PubMed(Vec::new()),
            Source::ClinicalTrials => SourceRecords::ClinicalTrials(Vec::new()),
            Source::Fda => SourceRecords::Fda(Vec::new()),
            Source::MedlinePlus => SourceRecords::MedlinePlus(Vec::new()),
            Source::Cdc => SourceRecords::Cdc(Vec::new()),
            Source::Who => SourceRecords::Who(Vec::new()),
        }
    }

    pub fn source(&self) -> Source {
        match self {
            SourceRecords::PubMed(_) => Source::PubMed,
            SourceRecords::ClinicalTrials(_) => Source::ClinicalTrials,
            SourceRecords::Fda(_) => Source::Fda,
            SourceRecords::MedlinePlus(_) => Source::MedlinePlus,
            SourceRecords::Cdc(_) => Source::Cdc,
            SourceRecords::Who(_) => Source::Who,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SourceRecords::PubMed(v) => v.len(),
            SourceRecords::ClinicalTrials(v) => v.len(),
            SourceRecords::Fda(v) => v.len(),
            SourceRecords::MedlinePlus(v) => v.len(),
            SourceRecords::Cdc(v) => v.len(),
            SourceRecords::Who(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `other` if it comes from the same source.
    ///
    /// Returns `false` (and drops nothing from `self`) on a source mismatch.
    pub fn extend(&mut self, other: SourceRecords) -> bool {
        match (self, other) {
            (SourceRecords::PubMed(a), SourceRecords::PubMed(b)) => a.extend(b),
            (SourceRecords::ClinicalTrials(a), SourceRecords::ClinicalTrials(b)) => a.extend(b),
            (SourceRecords::Fda(a), SourceRecords::Fda(b)) => a.extend(b),
            (SourceRecords::MedlinePlus(a), SourceRecords::MedlinePlus(b)) => a.extend(b),
            (SourceRecords::Cdc(a), SourceRecords::Cdc(b)) => a.extend(b),
            (SourceRecords::Who(a), SourceRecords::Who(b)) => a.extend(b),
            _ => return false,
        }
        true
    }
}

/// Fetched records grouped by source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResults {
    by_source: BTreeMap<Source, SourceRecords>,
}

impl RawResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `source` has an entry, empty if nothing was fetched.
    pub fn ensure(&mut self, source: Source) {
        self.by_source
            .entry(source)
            .or_insert_with(|| SourceRecords::empty(source));
    }

    /// Add records, appending to any already held for the same source.
    pub fn insert(&mut self, records: SourceRecords) {
        let source = records.source();
        match self.by_source.get_mut(&source) {
            Some(existing) => {
                existing.extend(records);
            }
            None => {
                self.by_source.insert(source, records);
            }
        }
    }

    pub fn get(&self, source: Source) -> Option<&SourceRecords> {
        self.by_source.get(&source)
    }

    /// Entries in canonical source order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceRecords> {
        self.by_source.values()
    }

    /// Total record count across sources.
    pub fn total(&self) -> usize {
        self.by_source.values().map(SourceRecords::len).sum()
    }
}
