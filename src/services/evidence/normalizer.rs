//! Evidence Normalizer
//!
//! Maps raw per-source records into the canonical `EvidenceItem` schema.
//! Free text is stripped of markup, missing fields become the fixed
//! placeholder strings the ranker recognises, and structured records get
//! labeled content sections.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};

use carewise_core::evidence::{
    NOT_AVAILABLE, NOT_SPECIFIED, NO_ABSTRACT, NO_DESCRIPTION, NO_SUMMARY, NO_TITLE,
};
use carewise_core::{EvidenceItem, Source};

use crate::services::sources::{
    CdcRecord, DrugLabel, HealthTopic, PubMedArticle, RawResults, SourceRecords, TrialRecord,
    WhoObservation,
};

/// Characters of the cleaned title kept in a synthesized id.
pub const ID_TITLE_CHARS: usize = 20;

/// Characters kept from each FDA label section.
pub const LABEL_SECTION_CHARS: usize = 500;

const UNKNOWN: &str = "Unknown";
const UNKNOWN_DRUG: &str = "Unknown Drug";
const NO_SAFETY_INFO: &str = "No safety information available";
const GLOBAL: &str = "Global";

fn tag_regex() -> Option<&'static Regex> {
    static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]+>").ok()).as_ref()
}

fn whitespace_regex() -> Option<&'static Regex> {
    static WHITESPACE: OnceLock<Option<Regex>> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").ok()).as_ref()
}

/// Remove `<...>` tags, collapse whitespace runs to one space and trim.
pub fn strip_markup(text: &str) -> String {
    let without_tags = match tag_regex() {
        Some(re) => re.replace_all(text, ""),
        None => text.into(),
    };
    let collapsed = match whitespace_regex() {
        Some(re) => re.replace_all(&without_tags, " ").into_owned(),
        None => without_tags.split_whitespace().collect::<Vec<_>>().join(" "),
    };
    collapsed.trim().to_string()
}

/// `"{prefix}-{first 20 chars of title}"`.
pub fn synthesize_id(prefix: &str, clean_title: &str) -> String {
    let head: String = clean_title.chars().take(ID_TITLE_CHARS).collect();
    format!("{}-{}", prefix, head)
}

/// Present and non-empty, else `None`.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn clean_or(value: &Option<String>, placeholder: &str) -> String {
    strip_markup(present(value).unwrap_or(placeholder))
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Capitalize the first letter of every word, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_word_start = !c.is_alphabetic();
    }
    out
}

/// Render a JSON scalar the way it reads in prose (strings unquoted).
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn normalize_pubmed(article: &PubMedArticle) -> EvidenceItem {
    let title = clean_or(&article.title, NO_TITLE);
    let content = clean_or(&article.abstract_text, NO_ABSTRACT);
    let year = present(&article.year).map_or(Value::Null, |y| json!(y));

    EvidenceItem::new(synthesize_id("PMID", &title), title, content, Source::PubMed)
        .with_metadata("year", year)
        .with_metadata("type", "research_article")
}

pub fn normalize_trial(trial: &TrialRecord) -> EvidenceItem {
    let conditions = trial.conditions.join(", ");
    let status = present(&trial.status).unwrap_or(UNKNOWN).to_string();
    let phase = if trial.phases.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        trial.phases.join(", ")
    };
    let content = format!(
        "Conditions: {}\nStatus: {}\nPhase: {}",
        conditions, status, phase
    );
    let id = present(&trial.nct_id).unwrap_or(UNKNOWN).to_string();
    let nct_id = present(&trial.nct_id).map_or(Value::Null, |id| json!(id));

    EvidenceItem::new(
        id,
        clean_or(&trial.title, NO_TITLE),
        content,
        Source::ClinicalTrials,
    )
    .with_metadata("nct_id", nct_id)
    .with_metadata("status", status)
    .with_metadata("phase", phase)
    .with_metadata("conditions", trial.conditions.clone())
}

pub fn normalize_label(label: &DrugLabel) -> EvidenceItem {
    let drug = if label.drug.trim().is_empty() {
        UNKNOWN_DRUG.to_string()
    } else {
        label.drug.clone()
    };

    let mut sections = Vec::new();
    if let Some(warnings) = present(&label.warnings).filter(|w| *w != NOT_AVAILABLE) {
        sections.push(format!(
            "WARNINGS:\n{}",
            truncate_chars(warnings, LABEL_SECTION_CHARS)
        ));
    }
    if let Some(adverse) = present(&label.adverse_reactions).filter(|a| *a != NOT_AVAILABLE) {
        sections.push(format!(
            "ADVERSE REACTIONS:\n{}",
            truncate_chars(adverse, LABEL_SECTION_CHARS)
        ));
    }
    let content = if sections.is_empty() {
        NO_SAFETY_INFO.to_string()
    } else {
        sections.join("\n\n")
    };
    let purpose = present(&label.purpose).unwrap_or(NOT_AVAILABLE).to_string();

    EvidenceItem::new(
        drug.clone(),
        format!("{} - Drug Safety Information", drug),
        content,
        Source::Fda,
    )
    .with_metadata("drug_name", drug)
    .with_metadata("purpose", purpose)
    .with_metadata("type", "drug_label")
}

pub fn normalize_topic(topic: &HealthTopic) -> EvidenceItem {
    let title = clean_or(&topic.title, NO_TITLE);
    let content = clean_or(&topic.summary, NO_SUMMARY);
    EvidenceItem::new(synthesize_id("MLP", &title), title, content, Source::MedlinePlus)
        .with_metadata("type", "health_topic")
}

pub fn normalize_cdc(record: &CdcRecord) -> EvidenceItem {
    let title = clean_or(&record.title, NO_TITLE);
    let content = clean_or(&record.description, NO_DESCRIPTION);
    EvidenceItem::new(synthesize_id("CDC", &title), title, content, Source::Cdc)
        .with_metadata("type", "public_health")
}

pub fn normalize_observation(obs: &WhoObservation) -> EvidenceItem {
    let indicator = if obs.indicator.is_empty() {
        UNKNOWN
    } else {
        obs.indicator.as_str()
    };
    let topic = if obs.topic.is_empty() {
        UNKNOWN
    } else {
        obs.topic.as_str()
    };
    let country = present(&obs.country).unwrap_or(GLOBAL).to_string();
    let year = obs.year.clone().unwrap_or_else(|| json!(NOT_AVAILABLE));
    let value = obs.value.clone().unwrap_or_else(|| json!(NOT_AVAILABLE));
    let year_text = display_value(&year);

    let title = format!("{} - {} ({})", title_case(topic), country, year_text);
    let content = format!(
        "Indicator: {}\nCountry: {}\nYear: {}\nValue: {}",
        indicator,
        country,
        year_text,
        display_value(&value)
    );

    EvidenceItem::new(
        format!("WHO-{}-{}-{}", indicator, country, year_text),
        title,
        content,
        Source::Who,
    )
    .with_metadata("indicator", indicator)
    .with_metadata("country", country)
    .with_metadata("year", year)
    .with_metadata("value", value)
    .with_metadata("type", "health_statistic")
}

/// Normalize one source's records, preserving input order.
pub fn normalize_records(records: &SourceRecords) -> Vec<EvidenceItem> {
    match records {
        SourceRecords::PubMed(v) => v.iter().map(normalize_pubmed).collect(),
        SourceRecords::ClinicalTrials(v) => v.iter().map(normalize_trial).collect(),
        SourceRecords::Fda(v) => v.iter().map(normalize_label).collect(),
        SourceRecords::MedlinePlus(v) => v.iter().map(normalize_topic).collect(),
        SourceRecords::Cdc(v) => v.iter().map(normalize_cdc).collect(),
        SourceRecords::Who(v) => v.iter().map(normalize_observation).collect(),
    }
}

/// Normalize everything in `raw`.
///
/// Biomedical sources come first, then general-health sources, each in
/// input order.
pub fn normalize(raw: &RawResults) -> Vec<EvidenceItem> {
    let mut evidence = Vec::with_capacity(raw.total());
    for source in Source::ALL {
        if let Some(records) = raw.get(source) {
            let items = normalize_records(records);
            tracing::debug!(source = %source, count = items.len(), "Normalized records");
            evidence.extend(items);
        }
    }
    tracing::info!(count = evidence.len(), "Normalization complete");
    evidence
}
