//! Settings Models
//!
//! Process configuration loaded once at startup and passed explicitly to the
//! planner, the source clients and the answer generator.
//!
//! Resolution order: defaults, then the TOML file, then environment
//! variables, then command-line overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use carewise_core::Source;
use carewise_llm::{ProviderConfig, ProxyConfig};

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths;

pub const ENV_OLLAMA_URL: &str = "CAREWISE_OLLAMA_URL";
pub const ENV_MODEL: &str = "CAREWISE_MODEL";
pub const ENV_PUBMED_API_KEY: &str = "CAREWISE_PUBMED_API_KEY";
pub const ENV_FDA_API_KEY: &str = "CAREWISE_FDA_API_KEY";

/// Complete CareWise configuration (`config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarewiseConfig {
    pub llm: LlmSettings,
    pub planner: PlannerSettings,
    pub sources: SourceSettings,
    pub answer: AnswerSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,
}

/// Text-completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    /// Sampling temperature (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens per reply (0 = model default)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_ollama_url() -> String {
    carewise_llm::OLLAMA_DEFAULT_URL.to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    carewise_llm::DEFAULT_TIMEOUT_SECS
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_model(),
            timeout_secs: default_llm_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Planner repair-loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerSettings {
    /// Generator invocations per query (at least 1)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_retries() -> u32 {
    crate::services::planning::MAX_RETRIES
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

/// Per-source result limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLimits {
    pub pubmed: usize,
    pub clinical_trials: usize,
    pub fda: usize,
    pub medlineplus: usize,
    pub cdc: usize,
    /// Rows kept per WHO indicator
    pub who: usize,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            pubmed: 10,
            clinical_trials: 10,
            fda: 5,
            medlineplus: 10,
            cdc: 10,
            who: 20,
        }
    }
}

impl SourceLimits {
    pub fn for_source(&self, source: Source) -> usize {
        match source {
            Source::PubMed => self.pubmed,
            Source::ClinicalTrials => self.clinical_trials,
            Source::Fda => self.fda,
            Source::MedlinePlus => self.medlineplus,
            Source::Cdc => self.cdc,
            Source::Who => self.who,
        }
    }
}

/// Evidence source endpoints and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub pubmed_esearch_url: String,
    pub pubmed_efetch_url: String,
    pub clinical_trials_url: String,
    pub fda_label_url: String,
    pub medlineplus_url: String,
    pub cdc_url: String,
    /// WHO GHO OData base; the indicator code is appended
    pub who_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubmed_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fda_api_key: Option<String>,
    pub timeout_secs: u64,
    pub limits: SourceLimits,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            pubmed_esearch_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi"
                .to_string(),
            pubmed_efetch_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi"
                .to_string(),
            clinical_trials_url: "https://clinicaltrials.gov/api/v2/studies".to_string(),
            fda_label_url: "https://api.fda.gov/drug/label.json".to_string(),
            medlineplus_url: "https://wsearch.nlm.nih.gov/ws/query".to_string(),
            cdc_url: "https://data.cdc.gov/resource/bi63-dtpu.json".to_string(),
            who_base_url: "https://ghoapi.azureedge.net/api/".to_string(),
            pubmed_api_key: None,
            fda_api_key: None,
            timeout_secs: 30,
            limits: SourceLimits::default(),
        }
    }
}

/// Grounded answer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    /// Evidence items placed in the answer prompt
    pub top_k: usize,
    pub enabled: bool,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            enabled: true,
        }
    }
}

/// Command-line overrides (highest precedence)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub ollama_url: Option<String>,
    pub model: Option<String>,
    pub top_k: Option<usize>,
    pub no_answer: bool,
}

impl CarewiseConfig {
    /// Resolve the configuration: defaults, TOML file, environment.
    ///
    /// An explicit `path` must exist. Without one, `~/.carewise/config.toml`
    /// is read when present.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match paths::config_path() {
                Ok(default_path) if default_path.is_file() => Self::from_file(&default_path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_OLLAMA_URL) {
            self.llm.base_url = url;
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            self.llm.model = model;
        }
        if let Some(key) = non_empty(ENV_PUBMED_API_KEY) {
            self.sources.pubmed_api_key = Some(key);
        }
        if let Some(key) = non_empty(ENV_FDA_API_KEY) {
            self.sources.fda_api_key = Some(key);
        }
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = overrides.ollama_url {
            self.llm.base_url = url;
        }
        if let Some(model) = overrides.model {
            self.llm.model = model;
        }
        if let Some(top_k) = overrides.top_k {
            self.answer.top_k = top_k;
        }
        if overrides.no_answer {
            self.answer.enabled = false;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        if reqwest::Url::parse(&self.llm.base_url).is_err() {
            return Err(AppError::config(format!(
                "Invalid llm.base_url: {}",
                self.llm.base_url
            )));
        }
        if self.llm.model.trim().is_empty() {
            return Err(AppError::config("llm.model must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.llm.temperature) {
            return Err(AppError::config(format!(
                "llm.temperature must be between 0.0 and 1.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.timeout_secs == 0 || self.sources.timeout_secs == 0 {
            return Err(AppError::config("timeout_secs must be at least 1"));
        }
        if self.planner.max_retries < 1 {
            return Err(AppError::config("planner.max_retries must be at least 1"));
        }
        if self.answer.top_k < 1 {
            return Err(AppError::config("answer.top_k must be at least 1"));
        }
        for source in Source::ALL {
            if self.sources.limits.for_source(source) == 0 {
                return Err(AppError::config(format!(
                    "sources.limits for {} must be at least 1",
                    source
                )));
            }
        }
        Ok(())
    }

    /// Provider configuration for the text-completion service
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            base_url: Some(self.llm.base_url.clone()),
            model: self.llm.model.clone(),
            max_tokens: self.llm.max_tokens,
            temperature: self.llm.temperature,
            timeout_secs: self.llm.timeout_secs,
            proxy: self.proxy.clone(),
        }
    }
}
