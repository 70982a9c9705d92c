//! Source Routing
//!
//! Pure translation of an [`ExecutionPlan`] into fetch requests: which
//! client to call and with what derived search input. No network access
//! happens here, so routing decisions are unit-testable.

use serde::Serialize;

use carewise_core::{Entities, ExecutionPlan, Source};

/// WHO Global Health Observatory indicator codes by lowercase topic.
const WHO_INDICATORS: &[(&str, &str)] = &[
    ("diabetes", "NCD_GLUC_04"),
    ("tuberculosis", "MDG_0000000020"),
    ("malaria", "MALARIA_EST_DEATHS"),
    ("hiv", "HIV_0000000026"),
    ("covid", "COVID19"),
    ("covid-19", "COVID19"),
    ("obesity", "NCD_BMI_30C"),
    ("hypertension", "NCD_HYP_PREVALENCE_A"),
    ("life expectancy", "WHOSIS_000001"),
    ("maternal mortality", "MDG_0000000026"),
];

/// Look up the WHO indicator code for a topic (case-insensitive).
pub fn who_indicator(topic: &str) -> Option<&'static str> {
    let key = topic.to_lowercase();
    WHO_INDICATORS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, code)| *code)
}

/// Join every entity, in category order, with single spaces.
pub fn build_search_term(entities: &Entities) -> String {
    entities
        .iter_all()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// What a client is asked to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchTarget {
    /// Free-text search term
    Search { term: String },
    /// A single drug name
    Drug { name: String },
    /// A statistic indicator looked up from a topic
    Indicator {
        topic: String,
        indicator: &'static str,
    },
}

impl std::fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchTarget::Search { term } => write!(f, "search '{}'", term),
            FetchTarget::Drug { name } => write!(f, "drug '{}'", name),
            FetchTarget::Indicator { topic, indicator } => {
                write!(f, "indicator {} ('{}')", indicator, topic)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    pub source: Source,
    pub target: FetchTarget,
}

/// A request the router declined to make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingSkip {
    pub source: Source,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingPlan {
    pub requests: Vec<FetchRequest>,
    pub skipped: Vec<RoutingSkip>,
}

/// Route a plan to fetch requests, in plan source order.
///
/// - FDA takes the first drug entity and is skipped when there is none.
/// - WHO issues one request per topic, then per disease, whose indicator is
///   known; unmapped entries are skipped.
/// - Every other source gets one search over all entities.
pub fn route_plan(plan: &ExecutionPlan) -> RoutingPlan {
    let mut routing = RoutingPlan::default();
    let term = build_search_term(&plan.entities);

    for &source in &plan.sources {
        match source {
            Source::Fda => match plan.entities.drugs.first() {
                Some(drug) => routing.requests.push(FetchRequest {
                    source,
                    target: FetchTarget::Drug { name: drug.clone() },
                }),
                None => routing.skipped.push(RoutingSkip {
                    source,
                    reason: "no drug specified in query".to_string(),
                }),
            },
            Source::Who => {
                let topics = plan
                    .entities
                    .topics
                    .iter()
                    .chain(plan.entities.diseases.iter());
                let mut any = false;
                for topic in topics {
                    any = true;
                    match who_indicator(topic) {
                        Some(indicator) => routing.requests.push(FetchRequest {
                            source,
                            target: FetchTarget::Indicator {
                                topic: topic.clone(),
                                indicator,
                            },
                        }),
                        None => routing.skipped.push(RoutingSkip {
                            source,
                            reason: format!("no indicator mapping for '{}'", topic),
                        }),
                    }
                }
                if !any {
                    routing.skipped.push(RoutingSkip {
                        source,
                        reason: "no topics or diseases to look up".to_string(),
                    });
                }
            }
            Source::PubMed | Source::ClinicalTrials | Source::MedlinePlus | Source::Cdc => {
                routing.requests.push(FetchRequest {
                    source,
                    target: FetchTarget::Search { term: term.clone() },
                })
            }
        }
    }

    for skip in &routing.skipped {
        tracing::info!(source = %skip.source, reason = %skip.reason, "skipping fetch");
    }
    routing
}
