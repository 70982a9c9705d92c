//! CareWise Core
//!
//! Domain types and pure rules for the CareWise query-planning and
//! evidence-ranking pipeline. This crate performs no I/O and depends only on
//! serde and thiserror.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `schema` - Intent and source registries, intent groups
//! - `plan` - Typed execution plan and entity categories
//! - `evidence` - Canonical evidence record and placeholder vocabulary
//! - `validator` - Plan validator upgrading untyped replies to `ExecutionPlan`

pub mod error;
pub mod evidence;
pub mod plan;
pub mod schema;
pub mod validator;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Registries ─────────────────────────────────────────────────────────
pub use schema::{Intent, IntentGroup, Source, BIOMEDICAL_SOURCES, GENERAL_HEALTH_SOURCES};

// ── Plan & Evidence ────────────────────────────────────────────────────
pub use evidence::{is_placeholder_content, EvidenceItem, ScoreBreakdown};
pub use plan::{Entities, ExecutionPlan, ENTITY_KEYS};

// ── Validation ─────────────────────────────────────────────────────────
pub use validator::{validate, validate_plan, PlanViolation};
