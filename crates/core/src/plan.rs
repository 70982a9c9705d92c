//! Execution Plan
//!
//! The typed plan produced once per query by the planner. Instances are only
//! built by the validator from a decoded generator reply, so every
//! `ExecutionPlan` in circulation already satisfies the group-separation rule.

use serde::{Deserialize, Serialize};

use crate::schema::{Intent, Source};

/// The five entity categories every plan carries, in canonical order.
pub const ENTITY_KEYS: [&str; 5] = ["diseases", "drugs", "therapies", "symptoms", "topics"];

/// Named spans extracted from the query.
///
/// Order is preserved and duplicates are kept; no case normalization is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub diseases: Vec<String>,
    pub drugs: Vec<String>,
    pub therapies: Vec<String>,
    pub symptoms: Vec<String>,
    pub topics: Vec<String>,
}

impl Entities {
    /// Entity list for a canonical key from [`ENTITY_KEYS`].
    pub fn get(&self, key: &str) -> Option<&[String]> {
        match key {
            "diseases" => Some(&self.diseases),
            "drugs" => Some(&self.drugs),
            "therapies" => Some(&self.therapies),
            "symptoms" => Some(&self.symptoms),
            "topics" => Some(&self.topics),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Vec<String>> {
        match key {
            "diseases" => Some(&mut self.diseases),
            "drugs" => Some(&mut self.drugs),
            "therapies" => Some(&mut self.therapies),
            "symptoms" => Some(&mut self.symptoms),
            "topics" => Some(&mut self.topics),
            _ => None,
        }
    }

    /// All entities flattened in category order.
    pub fn iter_all(&self) -> impl Iterator<Item = &String> {
        self.diseases
            .iter()
            .chain(self.drugs.iter())
            .chain(self.therapies.iter())
            .chain(self.symptoms.iter())
            .chain(self.topics.iter())
    }

    /// Total number of entity strings across all categories.
    pub fn len(&self) -> usize {
        self.diseases.len()
            + self.drugs.len()
            + self.therapies.len()
            + self.symptoms.len()
            + self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A validated, immutable query plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub intent: Intent,
    pub entities: Entities,
    pub sources: Vec<Source>,
    pub analysis_required: bool,
}

impl ExecutionPlan {
    /// Whether the plan names the given source.
    pub fn uses(&self, source: Source) -> bool {
        self.sources.contains(&source)
    }
}
