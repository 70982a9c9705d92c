//! Query Planning
//!
//! Turns a free-text question into a validated `ExecutionPlan`:
//! - `prompt` - Planning prompt builder
//! - `planner` - Self-healing repair loop around the text-completion service

pub mod planner;
pub mod prompt;

pub use planner::{
    decode_output, evaluate_output, schema_correction, AttemptOutcome, PlannerError,
    PlannerState, QueryPlanner, RepairSession, SessionStep, INVALID_JSON_CORRECTION, MAX_RETRIES,
};
pub use prompt::{build_planner_prompt, recommended_sources};
