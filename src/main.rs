//! scrivener - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use scrivener::generate::{GenerateOptions, run_generate};
use scrivener::openai::{ClientConfig, OpenAiClient, verify_configuration};
use scrivener::settings::Settings;

/// Generate commit messages from working-tree diffs using an
/// OpenAI-compatible API.
#[derive(Parser, Debug)]
#[command(name = "scrivener")]
#[command(about = "Generate commit messages from working-tree diffs using an OpenAI-compatible API")]
#[command(version)]
struct Cli {
    /// Path to the project repository (defaults to the current directory)
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Additional repository roots to include in the diff
    #[arg(long = "repo")]
    repos: Vec<PathBuf>,

    /// Build the diff as a reverse patch
    #[arg(long)]
    reverse: bool,

    /// Number of completion choices to request (the first one is used)
    #[arg(short = 'n', long, default_value = "1")]
    completions: u32,

    /// Create the commit after confirmation (single repository only)
    #[arg(long)]
    commit: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the model ids available on the configured API
    Models,
    /// Verify the API configuration by listing models
    Verify {
        /// Host override (blank means the default OpenAI host)
        #[arg(long)]
        host: Option<String>,
        /// API key override
        #[arg(long)]
        api_key: Option<String>,
        /// Proxy URL override
        #[arg(long)]
        proxy: Option<String>,
        /// Socket timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Step 1: Resolve the project root and load settings
    let project_root = cli
        .path
        .canonicalize()
        .with_context(|| format!("Cannot resolve path {}", cli.path.display()))?;
    let settings = Settings::load(&project_root).context("Failed to load configuration")?;

    // Step 2: Dispatch
    match cli.command {
        Some(Command::Models) => run_models(&settings).await,
        Some(Command::Verify {
            host,
            api_key,
            proxy,
            timeout,
        }) => run_verify(&settings, host, api_key, proxy, timeout).await,
        None => {
            let mut extra_roots = Vec::with_capacity(cli.repos.len());
            for repo in &cli.repos {
                let root = repo
                    .canonicalize()
                    .with_context(|| format!("Cannot resolve path {}", repo.display()))?;
                extra_roots.push(root);
            }
            let options = GenerateOptions {
                project_root,
                extra_roots,
                reverse: cli.reverse,
                completions: cli.completions,
                commit: cli.commit,
            };
            run_generate(options, &settings)
                .await
                .context("Failed to generate commit message")
        }
    }
}

/// List model ids on the configured API, one per line.
async fn run_models(settings: &Settings) -> Result<()> {
    let config = ClientConfig::from_settings(settings)?;
    let client = OpenAiClient::new(&config)?;
    let models = client.list_models().await.context("Failed to list models")?;
    for model in &models {
        println!("{}", model.id);
    }
    Ok(())
}

/// Check that the given (or configured) connection parameters can reach
/// the API.
async fn run_verify(
    settings: &Settings,
    host: Option<String>,
    api_key: Option<String>,
    proxy: Option<String>,
    timeout: Option<u64>,
) -> Result<()> {
    let api_key = match api_key {
        Some(key) => key,
        None => settings.api_key()?,
    };
    let host = host.or_else(|| settings.host().map(str::to_string));
    let proxy = proxy.or_else(|| settings.proxy().map(str::to_string));
    let timeout = timeout.unwrap_or(settings.timeout_secs());

    verify_configuration(host.as_deref(), &api_key, proxy.as_deref(), timeout)
        .await
        .context("Configuration verification failed")?;
    println!("Configuration OK");
    Ok(())
}

/// Set up the tracing subscriber. `--verbose` lowers the filter to debug;
/// an explicit RUST_LOG still wins.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose { "scrivener=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
