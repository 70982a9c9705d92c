//! Evidence Processing
//!
//! Normalization of raw source records into `EvidenceItem`s and their
//! ranking against an execution plan.
//!
//! ## Module Organization
//!
//! - `normalizer` - Per-source mapping, markup stripping, id synthesis
//! - `priority` - (intent, source) weight table and its startup check
//! - `ranker` - Four-factor scoring and stable sort

pub mod normalizer;
pub mod priority;
pub mod ranker;

pub use normalizer::{normalize, normalize_records, strip_markup, synthesize_id};
pub use priority::{source_priority, validate_priority_table, DEFAULT_PRIORITY};
pub use ranker::{composite_score, entity_terms, rank, rank_at, score_breakdown};
