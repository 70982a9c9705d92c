//! Execution Plan Validator
//!
//! Upgrades a decoded generator reply (an untyped `serde_json::Value`) into a
//! typed [`ExecutionPlan`], or reports the first rule it breaks. Checks run in
//! a fixed order and the first failure wins:
//!
//! 1. the plan is a JSON object
//! 2. `intent` names a registered intent
//! 3. `entities` is an object holding all five category arrays of strings
//! 4. `sources` is an array of registered source names
//! 5. every source belongs to the intent's group
//! 6. `analysis_required` is a boolean
//!
//! The validator is pure: the same input always yields the same verdict.

use serde_json::Value;

use crate::plan::{Entities, ExecutionPlan, ENTITY_KEYS};
use crate::schema::{format_names, Intent, IntentGroup, Source};

/// The first rule a candidate plan breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanViolation {
    NotAnObject,
    InvalidIntent,
    InvalidEntities,
    InvalidEntityField { key: &'static str },
    InvalidSources,
    UnknownSource { value: String },
    GroupViolation {
        intent: Intent,
        group: IntentGroup,
        offending: Vec<Source>,
    },
    InvalidAnalysisFlag,
}

impl std::fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanViolation::NotAnObject => write!(f, "Plan is not a JSON object"),
            PlanViolation::InvalidIntent => write!(
                f,
                "Invalid or missing intent. Must be one of: {}",
                format_names(&Intent::ALL)
            ),
            PlanViolation::InvalidEntities => write!(f, "Missing or invalid entities"),
            PlanViolation::InvalidEntityField { key } => {
                write!(f, "Invalid entities field: {}", key)
            }
            PlanViolation::InvalidSources => write!(f, "Missing or invalid sources"),
            PlanViolation::UnknownSource { value } => write!(
                f,
                "Invalid source: {}. Must be one of: {}",
                value,
                format_names(&Source::ALL)
            ),
            PlanViolation::GroupViolation {
                intent,
                group,
                offending,
            } => write!(
                f,
                "{} intent '{}' cannot use {}: {}. Use only: {}",
                group.label(),
                intent,
                group.foreign_sources_label(),
                format_names(offending),
                format_names(group.sources())
            ),
            PlanViolation::InvalidAnalysisFlag => write!(f, "Invalid analysis_required flag"),
        }
    }
}

impl std::error::Error for PlanViolation {}

/// Validate a decoded plan and upgrade it to the typed form.
pub fn validate_plan(raw: &Value) -> Result<ExecutionPlan, PlanViolation> {
    let obj = raw.as_object().ok_or(PlanViolation::NotAnObject)?;

    let intent = obj
        .get("intent")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Intent>().ok())
        .ok_or(PlanViolation::InvalidIntent)?;

    let entities = parse_entities(obj.get("entities"))?;
    let sources = parse_sources(obj.get("sources"))?;

    let allowed = intent.allowed_sources();
    let offending: Vec<Source> = sources
        .iter()
        .copied()
        .filter(|s| !allowed.contains(s))
        .collect();
    if !offending.is_empty() {
        return Err(PlanViolation::GroupViolation {
            intent,
            group: intent.group(),
            offending,
        });
    }

    let analysis_required = obj
        .get("analysis_required")
        .and_then(Value::as_bool)
        .ok_or(PlanViolation::InvalidAnalysisFlag)?;

    Ok(ExecutionPlan {
        intent,
        entities,
        sources,
        analysis_required,
    })
}

/// `(ok, error)` form of [`validate_plan`]; `error` is empty on success.
pub fn validate(raw: &Value) -> (bool, String) {
    match validate_plan(raw) {
        Ok(_) => (true, String::new()),
        Err(violation) => (false, violation.to_string()),
    }
}

fn parse_entities(value: Option<&Value>) -> Result<Entities, PlanViolation> {
    let map = value
        .and_then(Value::as_object)
        .ok_or(PlanViolation::InvalidEntities)?;

    let mut entities = Entities::default();
    for key in ENTITY_KEYS {
        let items = map
            .get(key)
            .and_then(Value::as_array)
            .ok_or(PlanViolation::InvalidEntityField { key })?;

        let mut strings = Vec::with_capacity(items.len());
        for item in items {
            let s = item
                .as_str()
                .ok_or(PlanViolation::InvalidEntityField { key })?;
            strings.push(s.to_string());
        }

        if let Some(slot) = entities.get_mut(key) {
            *slot = strings;
        }
    }

    Ok(entities)
}

fn parse_sources(value: Option<&Value>) -> Result<Vec<Source>, PlanViolation> {
    let items = value
        .and_then(Value::as_array)
        .ok_or(PlanViolation::InvalidSources)?;

    let mut sources: Vec<Source> = Vec::with_capacity(items.len());
    for item in items {
        let source = item
            .as_str()
            .and_then(|s| s.parse::<Source>().ok())
            .ok_or_else(|| PlanViolation::UnknownSource {
                value: match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })?;
        // `sources` is a set; keep the first occurrence only.
        if !sources.contains(&source) {
            sources.push(source);
        }
    }

    Ok(sources)
}
