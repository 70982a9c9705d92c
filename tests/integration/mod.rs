//! Integration Tests Module
//!
//! End-to-end tests for the CareWise pipeline: the self-healing planner,
//! normalization of parsed upstream payloads, ranking, and full pipeline runs
//! against scripted providers and sources.

// Shared mocks
mod support;

// Planner repair loop and failure paths
mod planner_test;

// Source payload parsing into canonical evidence
mod normalizer_test;

// Sub-scores, composite bounds and stable ordering
mod ranking_test;

// Full pipeline runs with partial source failures
mod pipeline_test;
