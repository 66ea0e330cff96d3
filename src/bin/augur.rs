//! augur: classify one utterance from the command line.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;

use augur::config::{API_KEY_ENV, Config, Credentials};
use augur::providers::OpenAiClient;
use augur::Classifier;
use augur::cli::{Invocation, Overrides};

/// Classify text into an intent label with a chat model
#[derive(Parser)]
#[command(name = "augur")]
#[command(version)]
#[command(about = "Classify text into an intent label using a prompt template")]
struct Args {
    /// Text to classify (or omit to read from stdin)
    #[arg(short, long)]
    text: Option<String>,

    /// Prompt template name (see --list-prompts)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Chat model name
    #[arg(short, long)]
    model: Option<String>,

    /// Comma-separated labels; empty uses the defaults
    #[arg(short, long)]
    labels: Option<String>,

    /// Sampling temperature
    #[arg(short = 'T', long)]
    temperature: Option<f32>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fall back when the model answers with a label outside the set
    #[arg(long)]
    strict_labels: bool,

    /// Print the available prompt templates and exit
    #[arg(long)]
    list_prompts: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load(args.config.as_deref())?;
    let registry = Arc::new(config.registry());

    if args.list_prompts {
        for name in registry.available() {
            println!("{name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let overrides = Overrides {
        prompt: args.prompt,
        model: args.model,
        labels: args.labels,
        temperature: args.temperature,
        strict_labels: args.strict_labels,
    };
    let invocation = Invocation::resolve(&config, &registry, overrides)?;

    let credentials =
        Credentials::from_env().with_fallback_base_url(config.provider.base_url.as_deref());
    if credentials.api_key.is_none() {
        eprintln!("{API_KEY_ENV} is not set; export it before running augur.");
        return Ok(ExitCode::FAILURE);
    }

    let text = resolve_text(args.text)?;

    let client = OpenAiClient::from_credentials(&credentials)?.timeout(config.request_timeout());
    debug!(
        base_url = client.base_url(),
        model = %invocation.options.model,
        template = %invocation.template,
        "dispatching"
    );

    let classifier = Classifier::new(Arc::new(client))
        .registry(registry)
        .options(invocation.options)
        .label_policy(invocation.label_policy);

    let result = classifier
        .classify(&text, &invocation.template, &invocation.labels)
        .await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(ExitCode::SUCCESS)
}

/// Resolve the utterance from `--text`, or from stdin when it is piped.
fn resolve_text(arg: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(text) = arg {
        return Ok(text);
    }
    if io::stdin().is_terminal() {
        return Err("no input provided (pass --text or pipe text via stdin)".into());
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    let text = buf.trim();
    if text.is_empty() {
        return Err("no input provided (stdin was empty)".into());
    }
    Ok(text.to_string())
}
