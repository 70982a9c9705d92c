//! CareWise CLI
//!
//! Command-line front end for the query-planning and evidence-ranking
//! pipeline. Results go to stdout; logs go to stderr.

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use carewise::models::{CarewiseConfig, ConfigOverrides};
use carewise::services::pipeline::{Pipeline, PipelineReport};
use carewise::utils::init_logging;
use carewise_llm::{LlmProvider, OllamaProvider};

#[derive(Parser)]
#[command(name = "carewise", version, about = "Evidence-grounded health research assistant")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// Configuration file (default: ~/.carewise/config.toml when present)
    #[arg(long, global = true, env = "CAREWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Model used for planning and answers
    #[arg(long, global = true)]
    model: Option<String>,

    /// Ollama server URL
    #[arg(long, global = true)]
    ollama_url: Option<String>,

    /// Evidence items passed to the answer stage
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Skip grounded answer generation
    #[arg(long, global = true)]
    no_answer: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline for a question
    Ask { query: String },

    /// Produce and print the execution plan only
    Plan { query: String },

    /// Validate a JSON plan from a file, or stdin with `-`
    Validate { input: String },

    /// Check that the text-completion service is reachable
    Check,
}

impl GlobalArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            ollama_url: self.ollama_url.clone(),
            model: self.model.clone(),
            top_k: self.top_k,
            no_answer: self.no_answer,
        }
    }
}

fn load_config(args: &GlobalArgs) -> Result<CarewiseConfig> {
    let mut config =
        CarewiseConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    config.apply_overrides(args.overrides());
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn build_provider(config: &CarewiseConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider = OllamaProvider::new(config.provider_config())
        .context("failed to create text-completion provider")?;
    Ok(Arc::new(provider))
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read plan from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input))
    }
}

fn print_report(report: &PipelineReport) {
    println!("Query: {}", report.query);
    println!("Intent: {}", report.plan.intent);
    println!(
        "Sources: {}",
        report
            .plan
            .sources
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    for skip in &report.skipped {
        println!("Skipped {}: {}", skip.source, skip.reason);
    }

    println!("\nEvidence ({} items):", report.evidence.len());
    for (i, item) in report.evidence.iter().enumerate() {
        println!(
            "{:>3}. [{:.3}] {} | {} | {}",
            i + 1,
            item.score_or_zero(),
            item.source,
            item.id,
            item.title
        );
    }

    if let Some(answer) = &report.answer {
        println!("\nAnswer:\n{}", answer.answer);
        if !answer.sources_used.is_empty() {
            println!("\nCited:");
            for citation in &answer.sources_used {
                println!("  [{}] {} ({})", citation.source, citation.title, citation.id);
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let global = &cli.global;

    match &cli.command {
        Command::Validate { input } => {
            let text = read_input(input)?;
            let raw: serde_json::Value =
                serde_json::from_str(&text).context("plan is not valid JSON")?;
            let (ok, error) = carewise_core::validate(&raw);
            if global.json {
                println!("{}", serde_json::json!({ "ok": ok, "error": error }));
            } else if ok {
                println!("Plan is valid");
            } else {
                println!("Plan is invalid: {}", error);
            }
            if !ok {
                std::process::exit(1);
            }
        }
        Command::Check => {
            let config = load_config(global)?;
            let provider = build_provider(&config)?;
            provider
                .health_check()
                .await
                .with_context(|| format!("{} is not reachable", config.llm.base_url))?;
            let models = provider.list_models().await.unwrap_or(None);
            println!("{} OK at {}", provider.name(), config.llm.base_url);
            match models {
                Some(models) if !models.iter().any(|m| m == provider.model()) => {
                    println!("Warning: model '{}' is not installed", provider.model());
                }
                _ => println!("Model: {}", provider.model()),
            }
        }
        Command::Plan { query } => {
            let config = load_config(global)?;
            let pipeline = Pipeline::from_config(&config, build_provider(&config)?)?;
            let plan = pipeline.plan(query).await?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Ask { query } => {
            if query.trim().is_empty() {
                bail!("query must not be empty");
            }
            let config = load_config(global)?;
            let pipeline = Pipeline::from_config(&config, build_provider(&config)?)?;
            let report = pipeline.run(query).await?;
            if global.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.log_json);
    run(cli).await
}
