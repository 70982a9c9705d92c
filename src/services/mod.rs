//! Services
//!
//! The query pipeline and the stages it drives.

pub mod answer;
pub mod evidence;
pub mod pipeline;
pub mod planning;
pub mod sources;

pub use answer::{AnswerGenerator, GroundedAnswer, SourceCitation};
pub use pipeline::{Pipeline, PipelineReport};
pub use planning::{PlannerError, QueryPlanner};
pub use sources::{SourceClient, SourceRegistry};
