//! Adaptive Crawler main entry point
//!
//! This is the command-line interface for the adaptive crawler.

use adaptive_crawler::config::{load_config_with_hash, Config};
use adaptive_crawler::output::{format_crawl_result, format_history, format_json, format_opportunities};
use adaptive_crawler::Orchestrator;
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Adaptive Crawler: intelligence-guided web crawling
///
/// Interprets a natural-language request, picks a crawl strategy, fetches the
/// target plus a few oracle-ranked follow-up links, and learns from every run.
#[derive(Parser, Debug)]
#[command(name = "adaptive-crawler")]
#[command(version)]
#[command(about = "Intelligence-guided web crawling", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an adaptive crawl of URL for a natural-language request
    Crawl {
        /// Target URL (http or https)
        url: String,

        /// What you are looking for, e.g. "find laptop deals"
        query: String,

        /// Extra context for intent analysis, as a JSON object
        #[arg(long, value_name = "JSON")]
        context: Option<String>,
    },

    /// Suggest URLs worth crawling on a domain
    Discover {
        /// Domain name, e.g. example.com
        domain: String,

        /// Topics of interest
        interests: Vec<String>,
    },

    /// Show recent learning records from the database
    History {
        /// Number of records to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Validate the configuration and print it
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).with_context(|| format!("loading {}", cli.config.display()));
        }
    };
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Check => handle_check(&config, &config_hash),
        Command::Crawl { url, query, context } => handle_crawl(&config, &url, &query, context, cli.json).await,
        Command::Discover { domain, interests } => handle_discover(&config, &domain, &interests, cli.json).await,
        Command::History { limit } => handle_history(&config, limit, cli.json).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("adaptive_crawler=info,warn"),
            1 => EnvFilter::new("adaptive_crawler=debug,info"),
            2 => EnvFilter::new("adaptive_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_context(raw: Option<String>) -> anyhow::Result<Option<Map<String, Value>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    match serde_json::from_str::<Value>(&raw).context("--context is not valid JSON")? {
        Value::Object(map) => Ok(Some(map)),
        _ => bail!("--context must be a JSON object"),
    }
}

/// Handles `check`: validates config and shows what would be used
fn handle_check(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    println!("=== Adaptive Crawler Configuration ===\n");

    println!("Crawler:");
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!("  Render JavaScript: {}", config.crawler.render_javascript);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOracle:");
    println!("  Endpoint: {}", config.oracle.base_url);
    println!("  Model: {}", config.oracle.model);
    println!("  Timeout: {}s", config.oracle.timeout_secs);
    println!("  Max tokens: {}", config.oracle.max_tokens);
    let key_state = if std::env::var(&config.oracle.api_key_env).is_ok() {
        "set"
    } else {
        "NOT SET (oracle decisions will use fallbacks)"
    };
    println!("  API key (${}): {}", config.oracle.api_key_env, key_state);

    println!("\nLearning:");
    println!("  Database: {}", config.learning.database_path);
    println!("  History window: {}", config.learning.history_window);

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
    Ok(())
}

/// Handles `crawl`: one adaptive crawl
async fn handle_crawl(
    config: &Config,
    url: &str,
    query: &str,
    context: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let context = parse_context(context)?;
    let orchestrator = Orchestrator::from_config(config)
        .await
        .context("initializing crawler")?;

    let result = orchestrator.adaptive_crawl(url, query, context).await?;

    if json {
        println!("{}", format_json(&result)?);
    } else {
        print!("{}", format_crawl_result(&result));
    }
    Ok(())
}

/// Handles `discover`: suggestions only, nothing is fetched
async fn handle_discover(config: &Config, domain: &str, interests: &[String], json: bool) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(config)
        .await
        .context("initializing crawler")?;

    let opportunities = orchestrator.proactive_discovery(domain, interests).await?;

    if json {
        println!("{}", format_json(&opportunities)?);
    } else {
        print!("{}", format_opportunities(domain, &opportunities));
    }
    Ok(())
}

/// Handles `history`: recent learning records from the database
async fn handle_history(config: &Config, limit: usize, json: bool) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(config)
        .await
        .context("initializing crawler")?;

    let records = orchestrator
        .stored_history(limit)
        .await
        .with_context(|| format!("reading {}", config.learning.database_path))?;

    if json {
        println!("{}", format_json(&records)?);
    } else {
        print!("{}", format_history(&records));
    }
    Ok(())
}
