//! SpecFlow CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration**: read an optional `.env` file, then resolve
//!    [`config::AppConfig`] from the environment. Any missing credential or
//!    target aborts before a run is accepted.
//! 2. **Wire observability**: install a `tracing-subscriber` stack with an
//!    optional OpenTelemetry OTLP exporter (see [`observability`]).
//! 3. **Construct infrastructure**: build the three generation adapters and
//!    the Notion record backend and inject them into a
//!    [`nodes::PipelineOrchestrator`].
//! 4. **Dispatch the command**:
//!    - `run`: validate one request from flags, run it, print the result JSON.
//!    - `serve`: expose the HTTP trigger until Ctrl-C.
//!    - `config`: print the resolved configuration with secrets redacted.
//!
//! Exit codes: `0` success, `1` configuration or pipeline failure, `2` invalid
//! request.

mod config;
mod observability;

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use llm::{AnthropicSpecifier, OpenAiDesigner, PerplexityResearcher};
use nodes::PipelineOrchestrator;
use notion::NotionRecordBackend;
use pipeline::{ConfigurationError, PipelineInput, RecordStore};
use tracing::{error, info, warn};

use crate::config::AppConfig;

const EXIT_INVALID_REQUEST: u8 = 2;

/// Turns a requirement into a specification, design, and research notes,
/// filed as a task record.
#[derive(Parser)]
#[command(name = "specflow", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline once and print the result as JSON.
    Run {
        /// Feature title.
        #[arg(long)]
        title: String,

        /// Free-text requirement.
        #[arg(long)]
        spec_prompt: String,

        /// URL of the originating input; enables source deduplication.
        #[arg(long)]
        source_url: Option<String>,

        /// Title for a newly created source record.
        #[arg(long)]
        source_title: Option<String>,
    },

    /// Serve the HTTP trigger until interrupted.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "SPECFLOW_BIND", default_value = "0.0.0.0:7071")]
        bind: SocketAddr,
    },

    /// Validate and print the configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal outside development.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let telemetry = match observability::init() {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("specflow: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match execute(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Command failed");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn execute(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Run {
            title,
            spec_prompt,
            source_url,
            source_title,
        } => {
            let input = PipelineInput {
                title: Some(title),
                spec_prompt: Some(spec_prompt),
                source_url,
                source_title,
            };
            run_once(input).await
        }
        Command::Serve { bind } => serve(bind).await.map(|()| ExitCode::SUCCESS),
        Command::Config => {
            let config = AppConfig::from_env()?;
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_once(input: PipelineInput) -> anyhow::Result<ExitCode> {
    let request = match input.validate() {
        Ok(request) => request,
        Err(e) => {
            warn!(missing = ?e.missing, "Rejected pipeline request");
            eprintln!("specflow: {e}");
            return Ok(ExitCode::from(EXIT_INVALID_REQUEST));
        }
    };

    let orchestrator = compose(&AppConfig::from_env()?)?;
    let result = orchestrator
        .run(&request)
        .await
        .with_context(|| format!("pipeline failed for '{}'", request.title()))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(ExitCode::SUCCESS)
}

async fn serve(bind: SocketAddr) -> anyhow::Result<()> {
    let orchestrator = Arc::new(compose(&AppConfig::from_env()?)?);

    listener::serve(bind, orchestrator, shutdown_signal()).await?;
    info!("Application shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl-C; shutting down"),
    }
}

/// Builds the orchestrator from resolved configuration.
fn compose(config: &AppConfig) -> Result<PipelineOrchestrator, ConfigurationError> {
    let specifier = AnthropicSpecifier::new(config.anthropic.clone())?;
    let designer = OpenAiDesigner::new(config.openai.clone())?;
    let researcher = PerplexityResearcher::new(config.perplexity.clone())?;
    let backend = NotionRecordBackend::new(config.notion.clone())?;

    info!(
        specifier_model = %config.anthropic.model,
        designer_model = %config.openai.model,
        researcher_model = %config.perplexity.model,
        researcher_configured = researcher.is_configured(),
        notion_integration = %config.notion_integration,
        "Pipeline wired"
    );

    PipelineOrchestrator::new(
        Arc::new(specifier),
        Arc::new(designer),
        Arc::new(researcher),
        RecordStore::new(Arc::new(backend)),
    )
}
