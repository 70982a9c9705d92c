//! Data Models
//!
//! Configuration structures for the CareWise pipeline.

pub mod settings;

pub use settings::{
    AnswerSettings, CarewiseConfig, ConfigOverrides, LlmSettings, PlannerSettings, SourceLimits,
    SourceSettings,
};
