//! CareWise - Rust Backend Library
//!
//! Query planning and evidence ranking for health research questions.
//! It includes:
//! - A self-healing planner driving a text-completion service
//! - Source routing and HTTP clients for six evidence providers
//! - Evidence normalization, ranking and grounded answers
//! - Configuration model, error type and logging setup

pub mod models;
pub mod services;
pub mod utils;

pub use models::{CarewiseConfig, ConfigOverrides};
pub use services::{Pipeline, PipelineReport};
pub use utils::error::{AppError, AppResult};
