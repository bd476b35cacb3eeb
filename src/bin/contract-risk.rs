//! CLI binary for contract-risk.
//!
//! `serve` runs the HTTP endpoint; `analyze` runs one local file through the
//! same pipeline and prints the envelope.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use contract_risk::{AnalysisResult, Analyzer, AnalyzerConfig, ServerConfig};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn score_colour(score: u8, s: &str) -> String {
    let code = match score {
        1..=3 => 32,
        4..=5 => 33,
        _ => 31,
    };
    format!("\x1b[{code}m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the endpoint on all interfaces
  contract-risk serve --host 0.0.0.0 --port 8080

  # Analyse one file
  contract-risk analyze lease.pdf

  # Score a document even if it is not recognised as a contract
  contract-risk analyze --skip-gatekeeper memo.docx --json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY               Credential for the default provider
  CONTRACT_RISK_PROVIDER       Override provider (openai, anthropic, gemini, ollama)
  CONTRACT_RISK_MODEL          Override model ID
  CONTRACT_RISK_CREDENTIAL_ENV Name of the variable holding the credential
  RUST_LOG                     Log filter (overrides --verbose)
"#;

/// Contract risk assessment from PDF and DOCX documents.
#[derive(Parser, Debug)]
#[command(
    name = "contract-risk",
    version,
    about = "Score the risk of legal contracts (PDF/DOCX) with an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    analysis: AnalysisArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "CONTRACT_RISK_VERBOSE")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve POST /api/risk-assessment.
    Serve {
        /// Interface to bind.
        #[arg(long, env = "CONTRACT_RISK_HOST", default_value = "127.0.0.1")]
        host: String,

        /// TCP port.
        #[arg(long, env = "CONTRACT_RISK_PORT", default_value_t = 8080)]
        port: u16,

        /// Largest accepted upload, in MiB.
        #[arg(long, env = "CONTRACT_RISK_MAX_UPLOAD_MB", default_value_t = 10)]
        max_upload_mb: usize,
    },

    /// Analyse a local .pdf or .docx file.
    Analyze {
        /// Path to the document.
        file: PathBuf,

        /// Score the document even if it is not recognised as a contract.
        #[arg(long)]
        skip_gatekeeper: bool,

        /// Print the JSON envelope instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct AnalysisArgs {
    /// LLM provider: openai, anthropic, gemini, ollama, …
    #[arg(long, global = true, env = "CONTRACT_RISK_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID.
    #[arg(long, global = true, env = "CONTRACT_RISK_MODEL")]
    model: Option<String>,

    /// Environment variable holding the provider credential.
    #[arg(long, global = true, env = "CONTRACT_RISK_CREDENTIAL_ENV")]
    credential_env: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, global = true, env = "CONTRACT_RISK_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max LLM output tokens.
    #[arg(long, global = true, env = "CONTRACT_RISK_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// Characters of document text sent to the LLM.
    #[arg(long, global = true, env = "CONTRACT_RISK_MAX_CHARS", default_value_t = 15_000)]
    max_chars: usize,

    /// LLM call timeout in seconds.
    #[arg(long, global = true, env = "CONTRACT_RISK_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Replace upstream error text with a generic message in responses.
    #[arg(long, global = true, env = "CONTRACT_RISK_REDACT_UPSTREAM_ERRORS")]
    redact_upstream_errors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let analyzer = Arc::new(Analyzer::new(build_config(&cli.analysis)?));

    match cli.command {
        Command::Serve {
            host,
            port,
            max_upload_mb,
        } => {
            let config = ServerConfig {
                host,
                port,
                max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            };
            contract_risk::serve(config, analyzer, shutdown_signal())
                .await
                .context("Server failed")?;
        }
        Command::Analyze {
            file,
            skip_gatekeeper,
            json,
        } => {
            let result = analyzer
                .analyze_file(&file, skip_gatekeeper)
                .await
                .with_context(|| format!("Analysis of {} failed", file.display()))?;

            if json {
                let out =
                    serde_json::to_string_pretty(&result).context("Failed to serialise result")?;
                println!("{out}");
            } else {
                print_summary(&result);
            }
        }
    }

    Ok(())
}

/// Map CLI args to `AnalyzerConfig`.
fn build_config(args: &AnalysisArgs) -> Result<AnalyzerConfig> {
    let mut builder = AnalyzerConfig::builder()
        .temperature(args.temperature)
        .max_tokens(args.max_tokens)
        .max_chars(args.max_chars)
        .api_timeout_secs(args.api_timeout)
        .redact_upstream_errors(args.redact_upstream_errors);

    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref var) = args.credential_env {
        builder = builder.credential_env(var.clone());
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(result: &AnalysisResult) {
    if !result.is_contract {
        println!("{}", bold("Not recognised as a legal contract."));
        println!("{}", dim("Re-run with --skip-gatekeeper to score it anyway."));
        return;
    }
    println!(
        "{}  {}",
        score_colour(result.risk_score, &bold(&format!("{}/10", result.risk_score))),
        result.interpretation
    );
    if !result.risk_summary.is_empty() {
        println!("\n{}", result.risk_summary);
    }
    if !result.key_risks.is_empty() {
        println!();
        for risk in &result.key_risks {
            println!("  • {risk}");
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutting down");
    }
}
