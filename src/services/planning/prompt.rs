//! Planner Prompt
//!
//! Renders a free-text query into the planning prompt: the intent and source
//! registries, the JSON shape, per-intent routing, and worked examples.
//! Sections are generated from the core registries so the prompt and the
//! validator can never disagree about names.

use std::fmt::Write;

use carewise_core::{Intent, IntentGroup, Source};
use serde_json::json;

/// Short description of each intent shown to the generator.
pub fn intent_description(intent: Intent) -> &'static str {
    match intent {
        Intent::LiteratureReview => "Research papers, latest studies, scientific findings",
        Intent::ClinicalTrials => "Ongoing, completed, or recruiting clinical trials",
        Intent::DrugSafety => "Side effects, warnings, adverse reactions",
        Intent::ComparativeResearch => "Comparison between treatments, drugs, or approaches",
        Intent::DataAnalysis => "Requests involving calculations, datasets, or statistics",
        Intent::SymptomsRelated => "Questions about symptoms, what they mean",
        Intent::Informational => "General information about diseases, conditions, health topics",
        Intent::GeneralHealth => "Lifestyle, prevention, wellness questions",
    }
}

fn source_description(source: Source) -> &'static str {
    match source {
        Source::PubMed => "Research articles (biomedical)",
        Source::ClinicalTrials => "Clinical trial data (biomedical)",
        Source::Fda => "Drug safety information (biomedical)",
        Source::MedlinePlus => "Consumer health information (general)",
        Source::Cdc => "Public health data (general)",
        Source::Who => "Global health statistics (general)",
    }
}

/// Sources the prompt recommends for each intent.
///
/// Always a subset of `intent.allowed_sources()`.
pub fn recommended_sources(intent: Intent) -> &'static [Source] {
    match intent {
        Intent::LiteratureReview => &[Source::PubMed],
        Intent::ClinicalTrials => &[Source::ClinicalTrials, Source::PubMed],
        Intent::DrugSafety => &[Source::Fda],
        Intent::ComparativeResearch => &[Source::PubMed, Source::ClinicalTrials],
        Intent::DataAnalysis => &[Source::PubMed],
        Intent::SymptomsRelated => &[Source::MedlinePlus, Source::Cdc],
        Intent::Informational => &[Source::MedlinePlus, Source::Cdc, Source::Who],
        Intent::GeneralHealth => &[Source::Cdc, Source::Who],
    }
}

fn group_heading(group: IntentGroup) -> &'static str {
    match group {
        IntentGroup::Biomedical => "BIOMEDICAL RESEARCH INTENTS:",
        IntentGroup::GeneralHealth => "GENERAL HEALTH INTENTS:",
    }
}

fn quoted_list(sources: &[Source]) -> String {
    let names: Vec<String> = sources.iter().map(|s| format!("\"{}\"", s)).collect();
    format!("[{}]", names.join(", "))
}

fn worked_examples() -> [(&'static str, serde_json::Value); 4] {
    [
        (
            "Any ongoing CAR-T trials for melanoma?",
            json!({
                "intent": "CLINICAL_TRIALS",
                "entities": {"diseases": ["melanoma"], "drugs": [], "therapies": ["CAR-T"], "symptoms": [], "topics": []},
                "sources": ["ClinicalTrials", "PubMed"],
                "analysis_required": false
            }),
        ),
        (
            "What are the side effects of pembrolizumab?",
            json!({
                "intent": "DRUG_SAFETY",
                "entities": {"diseases": [], "drugs": ["pembrolizumab"], "therapies": [], "symptoms": [], "topics": []},
                "sources": ["FDA"],
                "analysis_required": false
            }),
        ),
        (
            "What causes headaches and how to treat them?",
            json!({
                "intent": "SYMPTOMS_RELATED",
                "entities": {"diseases": [], "drugs": [], "therapies": [], "symptoms": ["headache"], "topics": ["headache treatment"]},
                "sources": ["MedlinePlus", "CDC"],
                "analysis_required": false
            }),
        ),
        (
            "Information about diabetes",
            json!({
                "intent": "INFORMATIONAL",
                "entities": {"diseases": ["diabetes"], "drugs": [], "therapies": [], "symptoms": [], "topics": ["diabetes"]},
                "sources": ["MedlinePlus", "CDC", "WHO"],
                "analysis_required": false
            }),
        ),
    ]
}

const JSON_FORMAT: &str = r#"{
  "intent": "",
  "entities": {
    "diseases": [],
    "drugs": [],
    "therapies": [],
    "symptoms": [],
    "topics": []
  },
  "sources": [],
  "analysis_required": false
}"#;

/// Build the base planning prompt for a query.
///
/// Deterministic in `query`; the planner appends corrective text to the
/// returned string across attempts.
pub fn build_planner_prompt(query: &str) -> String {
    let groups = [IntentGroup::Biomedical, IntentGroup::GeneralHealth];
    let mut prompt = String::with_capacity(4096);

    prompt.push_str("You are a unified health query planning engine.\n\n");
    prompt.push_str("Convert the user query into a structured execution plan in JSON.\n");
    prompt.push_str("Do NOT answer the query. Do NOT explain.\n\n");

    prompt.push_str("INTENTS (choose the most appropriate):\n");
    for group in groups {
        let _ = writeln!(prompt, "\n{}", group_heading(group));
        for intent in Intent::ALL.iter().filter(|i| i.group() == group) {
            let _ = writeln!(prompt, "- {}: {}", intent, intent_description(*intent));
        }
    }

    prompt.push_str("\nDATA SOURCES:\n");
    for source in Source::ALL {
        let _ = writeln!(prompt, "- {}: {}", source, source_description(source));
    }

    let _ = write!(prompt, "\nJSON FORMAT:\n{}\n", JSON_FORMAT);

    prompt.push_str("\nCRITICAL SOURCE ROUTING RULES (EXACT MAPPING):\n");
    for group in groups {
        let _ = writeln!(prompt, "\n{}", group_heading(group));
        for intent in Intent::ALL.iter().filter(|i| i.group() == group) {
            let _ = writeln!(
                prompt,
                "- {} → {}",
                intent,
                quoted_list(recommended_sources(*intent))
            );
        }
    }
    let _ = writeln!(
        prompt,
        "\nNEVER MIX biomedical sources ({}) with general health sources ({})!",
        join_names(IntentGroup::Biomedical.sources()),
        join_names(IntentGroup::GeneralHealth.sources())
    );

    prompt.push_str("\nEXAMPLES:\n");
    for (example_query, plan) in worked_examples() {
        let rendered = serde_json::to_string_pretty(&plan).unwrap_or_default();
        let _ = write!(prompt, "\nQuery: {}\nOutput:\n{}\n", example_query, rendered);
    }

    let _ = write!(
        prompt,
        "\nNow process this query:\n\"{}\"\n\nReturn ONLY JSON.\n",
        query
    );
    prompt
}

fn join_names(sources: &[Source]) -> String {
    sources
        .iter()
        .map(Source::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
