//! Query Planner
//!
//! Drives the text-completion service to a schema-valid [`ExecutionPlan`].
//!
//! Each generator reply is evaluated by a pure function into an
//! [`AttemptOutcome`]; a [`RepairSession`] folds those outcomes into the
//! growing prompt and decides whether to retry, succeed or give up. The
//! async [`QueryPlanner`] only shuttles text between the two, so the whole
//! repair protocol is testable without a generator.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use carewise_core::{validate_plan, ExecutionPlan};
use carewise_llm::{LlmError, LlmProvider, LlmRequestOptions};

use super::prompt::build_planner_prompt;

/// Default number of generator invocations per query.
pub const MAX_RETRIES: u32 = 3;

/// Appended after a reply that could not be decoded as JSON.
pub const INVALID_JSON_CORRECTION: &str = "\n\nYour previous output was INVALID JSON. Fix it.";

/// Appended after a reply the validator rejected.
pub fn schema_correction(error: &str) -> String {
    format!("\n\nERROR: {}\nFix the JSON. Output ONLY valid JSON.", error)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum PlannerError {
    /// Every attempt produced malformed or invalid output.
    #[error("Failed to generate valid execution plan after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// The text-completion service could not be used at all.
    #[error("Text-completion service unavailable: {0}")]
    GeneratorUnavailable(#[source] LlmError),
}

// ============================================================================
// Attempt evaluation (pure)
// ============================================================================

/// Result of evaluating one generator reply.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    ParsedOk(ExecutionPlan),
    ParseError(String),
    SchemaError(String),
}

/// Decode a generator reply into an untyped JSON value.
///
/// The trimmed reply is tried first; failing that, the first fenced block or
/// the outermost `{...}` span.
pub fn decode_output(raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty reply".to_string());
    }

    let direct_err = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e.to_string(),
    };

    match extract_json_object(trimmed) {
        Some(candidate) => serde_json::from_str::<Value>(&candidate).map_err(|e| e.to_string()),
        None => Err(direct_err),
    }
}

/// Evaluate one reply: decode, then validate.
pub fn evaluate_output(raw: &str) -> AttemptOutcome {
    let value = match decode_output(raw) {
        Ok(value) => value,
        Err(e) => return AttemptOutcome::ParseError(e),
    };
    match validate_plan(&value) {
        Ok(plan) => AttemptOutcome::ParsedOk(plan),
        Err(violation) => AttemptOutcome::SchemaError(violation.to_string()),
    }
}

/// Extract a JSON object from text that may wrap it in fences or prose.
fn extract_json_object(text: &str) -> Option<String> {
    if let Some(start) = text.find("```json") {
        let after_fence = &text[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return Some(after_fence[..end].trim().to_string());
        }
    }
    if let Some(start) = text.find("```") {
        let after_fence = &text[start + 3..];
        let after_lang = match after_fence.find('\n') {
            Some(nl) => &after_fence[nl + 1..],
            None => after_fence,
        };
        if let Some(end) = after_lang.find("```") {
            let content = after_lang[..end].trim();
            if content.starts_with('{') {
                return Some(content.to_string());
            }
        }
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => Some(text[start..=end].to_string()),
        _ => None,
    }
}

// ============================================================================
// Repair session (state machine)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    /// Waiting for the next generator reply.
    Drafting,
    /// Reply decoded; awaiting validation.
    Parsed,
    /// Terminal success.
    Validated,
    /// Terminal failure.
    Failed,
}

/// What the caller should do after an outcome is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStep {
    /// Invoke the generator again with [`RepairSession::prompt`].
    Retry,
    Done(ExecutionPlan),
    Exhausted { attempts: u32, last_error: String },
}

/// Prompt, attempt counter and state of one planning run.
///
/// The prompt only grows: corrective text is appended, never removed.
#[derive(Debug, Clone)]
pub struct RepairSession {
    prompt: String,
    attempts: u32,
    max_attempts: u32,
    state: PlannerState,
}

impl RepairSession {
    pub fn new(base_prompt: String, max_attempts: u32) -> Self {
        Self {
            prompt: base_prompt,
            attempts: 0,
            max_attempts: max_attempts.max(1),
            state: PlannerState::Drafting,
        }
    }

    /// Prompt to send on the next attempt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    fn transition(&mut self, next: PlannerState) {
        debug!(attempt = self.attempts, from = ?self.state, to = ?next, "planner state");
        self.state = next;
    }

    /// Apply the outcome of one attempt.
    pub fn advance(&mut self, outcome: AttemptOutcome) -> SessionStep {
        self.attempts += 1;

        let (correction, error) = match outcome {
            AttemptOutcome::ParsedOk(plan) => {
                self.transition(PlannerState::Parsed);
                self.transition(PlannerState::Validated);
                return SessionStep::Done(plan);
            }
            AttemptOutcome::ParseError(e) => {
                warn!(attempt = self.attempts, error = %e, "generator output is not valid JSON");
                (INVALID_JSON_CORRECTION.to_string(), format!("Invalid JSON: {}", e))
            }
            AttemptOutcome::SchemaError(e) => {
                self.transition(PlannerState::Parsed);
                warn!(attempt = self.attempts, error = %e, "plan rejected by validator");
                (schema_correction(&e), e)
            }
        };

        if self.attempts >= self.max_attempts {
            self.transition(PlannerState::Failed);
            return SessionStep::Exhausted {
                attempts: self.attempts,
                last_error: error,
            };
        }

        self.prompt.push_str(&correction);
        self.transition(PlannerState::Drafting);
        SessionStep::Retry
    }
}

// ============================================================================
// Planner
// ============================================================================

/// Produces a validated plan for a query using a text-completion provider.
pub struct QueryPlanner {
    provider: Arc<dyn LlmProvider>,
    max_retries: u32,
}

impl QueryPlanner {
    pub fn new(provider: Arc<dyn LlmProvider>, max_retries: u32) -> Self {
        Self {
            provider,
            max_retries: max_retries.max(1),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Plan a query.
    ///
    /// Attempts run strictly one after another. Generator failures are not
    /// retried and surface as [`PlannerError::GeneratorUnavailable`].
    pub async fn plan(&self, query: &str) -> Result<ExecutionPlan, PlannerError> {
        let mut session = RepairSession::new(build_planner_prompt(query), self.max_retries);

        loop {
            let attempt = session.attempts() + 1;
            debug!(attempt, prompt_len = session.prompt().len(), "requesting plan");

            let raw = self
                .provider
                .complete(session.prompt(), LlmRequestOptions::default())
                .await
                .map_err(|e| {
                    warn!(
                        attempt,
                        unreachable = e.is_connectivity(),
                        error = %e,
                        "text-completion call failed"
                    );
                    PlannerError::GeneratorUnavailable(e)
                })?;

            match session.advance(evaluate_output(&raw)) {
                SessionStep::Retry => continue,
                SessionStep::Done(plan) => {
                    info!(
                        attempts = session.attempts(),
                        intent = %plan.intent,
                        sources = plan.sources.len(),
                        "execution plan validated"
                    );
                    return Ok(plan);
                }
                SessionStep::Exhausted {
                    attempts,
                    last_error,
                } => {
                    warn!(attempts, error = %last_error, "planner retries exhausted");
                    return Err(PlannerError::RetriesExhausted {
                        attempts,
                        last_error,
                    });
                }
            }
        }
    }
}
