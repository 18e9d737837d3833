//! Cooper CLI - The Cooper Who Inspects Your Barrels
//!
//! Run end-to-end scenarios against a Barrel Monitor deployment.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cooper::api::{ApiState, start_api_server};
use cooper::config::{BASE_URL_ENV, Config, DEFAULT_CONFIG_FILE};
use cooper::report::Report;
use cooper::runner;
use cooper::scenarios::SCENARIOS;
use cooper_testkit::random::random_seed;

/// Cooper - end-to-end conformance checks for the Barrel Monitor API
#[derive(Debug, Parser)]
#[command(name = "cooper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run scenarios against a Barrel Monitor
    Run(RunArgs),

    /// Generate a default configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },

    /// List available scenarios
    List,

    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
}

fn setup_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.json);

    match cli.command {
        Commands::Run(args) => run_scenarios(args).await,

        Commands::Init { output } => init_config(&output),

        Commands::List => {
            list_scenarios();
            Ok(())
        }

        Commands::Validate { config } => validate_config(&config),
    }
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Path to configuration file (optional)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Base URL of the service under test
    #[arg(short, long, env = BASE_URL_ENV)]
    base_url: Option<String>,

    /// Specific scenarios to run (comma-separated)
    #[arg(short, long)]
    scenarios: Option<String>,

    /// Fixture seed, for replaying a run
    #[arg(long)]
    seed: Option<u64>,

    /// Timeout for the whole run
    #[arg(short, long, default_value = "30m", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Start HTTP status API on this port
    #[arg(long)]
    api_port: Option<u16>,

    /// Keep running after scenarios complete (for API access)
    #[arg(long)]
    keep_alive: bool,

    /// Write a JSON report to this path
    #[arg(short, long)]
    report: Option<PathBuf>,
}

/// Run scenarios against the configured target
async fn run_scenarios(args: RunArgs) -> Result<()> {
    tracing::info!(config = %args.config.display(), "Loading configuration");

    let config = Config::from_file_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?
        .with_base_url(args.base_url);

    let seed = args.seed.or(config.seed).unwrap_or_else(random_seed);
    let ctx = config
        .to_scenario_context(seed)
        .context("Failed to create scenario context")?;

    tracing::info!(
        target_name = %config.target.name,
        base_url = %ctx.client.base_url(),
        seed,
        "Target configured"
    );

    let planned = runner::plan(&config, args.scenarios.as_deref());
    if planned.is_empty() {
        tracing::warn!("No scenarios to run");
        return Ok(());
    }

    let api_state = ApiState::new();

    if let Some(port) = args.api_port {
        let state_clone = api_state.clone();
        tokio::spawn(async move {
            if let Err(e) = start_api_server(port, state_clone).await {
                tracing::error!(error = %e, "API server error");
            }
        });
        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let run = runner::run(ctx, planned, &api_state);
    let summary = match tokio::time::timeout(args.timeout, run).await {
        Ok(summary) => summary,
        Err(_) => {
            api_state.complete(false);
            anyhow::bail!(
                "Run did not finish within {}",
                humantime::format_duration(args.timeout)
            );
        }
    };

    let (cases_passed, cases_total) = summary.case_counts();
    if summary.passed {
        tracing::info!(cases_passed, cases_total, seed, "All scenarios PASSED");
    } else {
        let failed: Vec<&str> = summary
            .failed_scenarios()
            .map(|s| s.scenario_name.as_str())
            .collect();
        tracing::error!(
            cases_passed,
            cases_total,
            seed,
            ?failed,
            "Some scenarios FAILED"
        );
    }

    let passed = summary.passed;
    if let Some(path) = &args.report {
        Report::new(summary)
            .write(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    // If keep_alive is set and API is running, wait for Ctrl+C
    if args.keep_alive && args.api_port.is_some() {
        tracing::info!("Keeping alive for API access. Press Ctrl+C to exit.");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl+C")?;
    }

    if passed {
        Ok(())
    } else {
        anyhow::bail!("Some scenarios FAILED (replay with --seed {seed})")
    }
}

/// Generate a default configuration file
fn init_config(output: &Path) -> Result<()> {
    let config = Config::default_config();
    let yaml = config.to_yaml().context("Failed to serialize config")?;

    std::fs::write(output, &yaml)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    tracing::info!(path = %output.display(), "Configuration file created");
    println!("Created {}", output.display());
    println!();
    println!("Edit the file to point at your Barrel Monitor, then run:");
    println!("  cooper run --config {}", output.display());

    Ok(())
}

/// List available scenarios
fn list_scenarios() {
    println!("Available scenarios:");
    println!();

    for (name, scenario) in SCENARIOS.iter() {
        println!("  {name:24} - {}", scenario.description());
    }

    println!();
    println!("Run specific scenarios with:");
    println!("  cooper run --scenarios barrels,measurements");
}

/// Validate a configuration file
fn validate_config(config_path: &Path) -> Result<()> {
    tracing::info!(config = %config_path.display(), "Validating configuration");

    let config = Config::from_file(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let unknown: Vec<&str> = config
        .scenarios
        .keys()
        .map(String::as_str)
        .filter(|name| !SCENARIOS.contains_key(*name))
        .collect();
    if !unknown.is_empty() {
        anyhow::bail!("Unknown scenarios in config: {}", unknown.join(", "));
    }

    println!("Configuration is valid!");
    println!();
    println!("Target: {}", config.target.name);
    match &config.target.base_url {
        Some(url) => println!("Base URL: {url}"),
        None => println!("Base URL: (from --base-url or {BASE_URL_ENV})"),
    }
    println!(
        "Request timeout: {}",
        humantime::format_duration(config.target.request_timeout)
    );
    if let Some(seed) = config.seed {
        println!("Seed: {seed}");
    }

    println!();
    println!("Scenarios configured: {}", config.scenarios.len());

    for name in SCENARIOS.keys() {
        let Some(scenario_config) = config.scenario_config(name) else {
            continue;
        };
        let status = if scenario_config.enabled {
            "enabled"
        } else {
            "disabled"
        };
        println!("  - {name}: {status}");
    }

    Ok(())
}
