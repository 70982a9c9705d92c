//! Grounded Answer Generation
//!
//! Builds an evidence-grounded prompt from the top-ranked items and asks the
//! text-completion provider for an answer that cites its sources.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use carewise_core::{EvidenceItem, Source};
use carewise_llm::{LlmProvider, LlmRequestOptions};

use crate::utils::error::AppResult;

/// Characters of each evidence item's content quoted in the prompt.
pub const EVIDENCE_EXCERPT_CHARS: usize = 500;

const GROUNDING_RULES: &str = "CRITICAL RULES:
1. Base your answer ONLY on the evidence provided
2. DO NOT use external knowledge
3. Cite sources using [Source Name] after each claim
4. If evidence is insufficient, say \"Based on the available evidence, I cannot fully answer this question\"
5. Be concise, accurate, and clear
6. For health advice, include appropriate disclaimers";

/// An evidence item the answer cites by source name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub source: Source,
    pub title: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundedAnswer {
    pub answer: String,
    pub evidence_count: usize,
    pub sources_used: Vec<SourceCitation>,
    pub top_evidence: Vec<EvidenceItem>,
}

/// Render the grounding prompt for the first `top_k` ranked items.
pub fn build_grounding_prompt(query: &str, ranked: &[EvidenceItem], top_k: usize) -> String {
    let mut evidence_text = String::new();
    for (i, item) in ranked.iter().take(top_k).enumerate() {
        let excerpt: String = item.content.chars().take(EVIDENCE_EXCERPT_CHARS).collect();
        let _ = write!(
            evidence_text,
            "\n[Evidence {}] Source: {}\nTitle: {}\nContent: {}...\nRelevance Score: {:.2}\n",
            i + 1,
            item.source,
            item.title,
            excerpt,
            item.score_or_zero()
        );
    }

    let citation_tags = Source::ALL
        .iter()
        .map(|s| format!("[{}]", s))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a unified health research assistant. Answer the user's question using ONLY the provided evidence below.\n\n\
         {rules}\n\n\
         EVIDENCE:\n{evidence}\n\n\
         USER QUESTION:\n{query}\n\n\
         ANSWER (cite sources with {tags}):\n",
        rules = GROUNDING_RULES,
        evidence = evidence_text,
        query = query,
        tags = citation_tags,
    )
}

/// Top items whose source name occurs in `answer`, one entry per (source, id).
pub fn cited_sources(answer: &str, top: &[EvidenceItem]) -> Vec<SourceCitation> {
    let mut seen = HashSet::new();
    top.iter()
        .filter(|item| answer.contains(item.source.as_str()))
        .filter(|item| seen.insert((item.source, item.id.clone())))
        .map(|item| SourceCitation {
            source: item.source,
            title: item.title.clone(),
            id: item.id.clone(),
        })
        .collect()
}

pub struct AnswerGenerator {
    provider: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl AnswerGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, top_k: usize) -> Self {
        Self {
            provider,
            top_k: top_k.max(1),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn generate(&self, query: &str, ranked: &[EvidenceItem]) -> AppResult<GroundedAnswer> {
        let prompt = build_grounding_prompt(query, ranked, self.top_k);
        debug!(prompt_len = prompt.len(), top_k = self.top_k, "requesting grounded answer");

        let raw = self
            .provider
            .complete(&prompt, LlmRequestOptions::default())
            .await?;
        let answer = raw.trim().to_string();

        let top: Vec<EvidenceItem> = ranked.iter().take(self.top_k).cloned().collect();
        let sources_used = cited_sources(&answer, &top);
        info!(
            evidence = top.len(),
            cited = sources_used.len(),
            "grounded answer generated"
        );

        Ok(GroundedAnswer {
            answer,
            evidence_count: top.len(),
            sources_used,
            top_evidence: top,
        })
    }
}
