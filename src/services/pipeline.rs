//! Query Pipeline
//!
//! One run per query: plan → route → concurrent fetch → normalize → rank →
//! optional grounded answer. A planning failure aborts the run before any
//! source is contacted; a failing source only loses its own records.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use carewise_core::{EvidenceItem, ExecutionPlan};
use carewise_llm::LlmProvider;

use crate::models::{CarewiseConfig, SourceLimits};
use crate::services::answer::{AnswerGenerator, GroundedAnswer};
use crate::services::evidence::{normalize, rank, validate_priority_table};
use crate::services::planning::QueryPlanner;
use crate::services::sources::{
    route_plan, FetchRequest, RawResults, RoutingSkip, SourceRecords, SourceRegistry,
};
use crate::utils::error::AppResult;

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub query: String,
    pub plan: ExecutionPlan,
    pub skipped: Vec<RoutingSkip>,
    /// Ranked, highest score first.
    pub evidence: Vec<EvidenceItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<GroundedAnswer>,
}

pub struct Pipeline {
    planner: QueryPlanner,
    registry: SourceRegistry,
    limits: SourceLimits,
    answer: Option<AnswerGenerator>,
}

impl Pipeline {
    pub fn new(planner: QueryPlanner, registry: SourceRegistry, limits: SourceLimits) -> Self {
        Self {
            planner,
            registry,
            limits,
            answer: None,
        }
    }

    pub fn with_answer(mut self, generator: AnswerGenerator) -> Self {
        self.answer = Some(generator);
        self
    }

    /// Wire the pipeline from resolved configuration.
    ///
    /// Also checks the source-priority table, so a broken table fails here
    /// instead of during ranking.
    pub fn from_config(config: &CarewiseConfig, provider: Arc<dyn LlmProvider>) -> AppResult<Self> {
        validate_priority_table()?;
        let registry = SourceRegistry::from_settings(&config.sources, config.proxy.as_ref())?;
        let planner = QueryPlanner::new(provider.clone(), config.planner.max_retries);
        let pipeline = Self::new(planner, registry, config.sources.limits.clone());

        Ok(if config.answer.enabled {
            pipeline.with_answer(AnswerGenerator::new(provider, config.answer.top_k))
        } else {
            pipeline
        })
    }

    pub fn planner(&self) -> &QueryPlanner {
        &self.planner
    }

    /// Run every fetch request concurrently and group the results by source.
    ///
    /// Every source named by the plan gets an entry, empty when it was
    /// skipped or its requests failed.
    pub async fn fetch(&self, plan: &ExecutionPlan, requests: &[FetchRequest]) -> RawResults {
        let fetches = requests.iter().map(|request| self.fetch_one(request));
        let outcomes = join_all(fetches).await;

        let mut raw = RawResults::new();
        for source in &plan.sources {
            raw.ensure(*source);
        }
        for records in outcomes {
            raw.insert(records);
        }
        raw
    }

    async fn fetch_one(&self, request: &FetchRequest) -> SourceRecords {
        let source = request.source;
        let Some(client) = self.registry.get(source) else {
            warn!(source = %source, "no client registered, returning no records");
            return SourceRecords::empty(source);
        };

        match client.fetch(&request.target, self.limits.for_source(source)).await {
            Ok(records) => {
                info!(
                    source = %source,
                    target = %request.target,
                    count = records.len(),
                    "fetched records"
                );
                records
            }
            Err(e) => {
                warn!(
                    source = %source,
                    target = %request.target,
                    error = %e,
                    "fetch failed, continuing without it"
                );
                SourceRecords::empty(source)
            }
        }
    }

    /// Plan only; no source is contacted.
    pub async fn plan(&self, query: &str) -> AppResult<ExecutionPlan> {
        Ok(self.planner.plan(query).await?)
    }

    /// Run the whole pipeline for one query.
    pub async fn run(&self, query: &str) -> AppResult<PipelineReport> {
        let plan = self.planner.plan(query).await?;

        let routing = route_plan(&plan);
        let raw = self.fetch(&plan, &routing.requests).await;
        info!(
            requests = routing.requests.len(),
            skipped = routing.skipped.len(),
            records = raw.total(),
            "data acquisition complete"
        );

        let evidence = rank(normalize(&raw), &plan);

        let answer = match &self.answer {
            Some(generator) => Some(generator.generate(query, &evidence).await?),
            None => None,
        };

        Ok(PipelineReport {
            query: query.to_string(),
            plan,
            skipped: routing.skipped,
            evidence,
            answer,
        })
    }
}
