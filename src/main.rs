use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rasctl::config::{LogFormat, LoggingConfig, RasctlConfig};
use rasctl::runs::query::RunsCriteria;
use rasctl::{RasClient, StdoutConsole};

#[derive(Parser)]
#[command(
    name = "rasctl",
    about = "Query and cancel test runs held in a Result Archive Store",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the API server (overrides the configuration file)
    #[arg(long, global = true, env = "RASCTL_API_SERVER_URL")]
    api_server_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with test runs
    Runs {
        #[command(subcommand)]
        action: RunsAction,
    },
}

#[derive(Subcommand)]
enum RunsAction {
    /// Show runs from the archive
    Get(GetArgs),

    /// Cancel a run by name, or every run in a group
    Cancel {
        /// Run name, e.g. U456
        #[arg(long)]
        name: Option<String>,

        /// Group whose runs should all be cancelled
        #[arg(long)]
        group: Option<String>,
    },
}

#[derive(Args)]
struct GetArgs {
    /// Run name, e.g. U456
    #[arg(long)]
    name: Option<String>,

    /// Time window as <from>[:<to>], e.g. 5d:12h (units: w, d, h, m)
    #[arg(long, default_value = "")]
    age: String,

    /// Only runs submitted by this requestor
    #[arg(long)]
    requestor: Option<String>,

    /// Only runs with these results (repeatable or comma-separated)
    #[arg(long)]
    result: Vec<String>,

    /// Only runs that have not finished yet
    #[arg(long)]
    active: bool,

    /// Only runs in this group
    #[arg(long)]
    group: Option<String>,

    /// Only runs carrying these tags (repeatable or comma-separated)
    #[arg(long)]
    tags: Vec<String>,

    /// Output format: summary, details or raw
    #[arg(long, default_value = "summary")]
    format: String,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RasctlConfig::resolve(cli.config.as_deref())?;
    if let Some(url) = cli.api_server_url {
        config.server.api_server_url = url;
    }
    init_tracing(&config.logging);
    tracing::debug!(api_server_url = %config.server.api_server_url, "configuration resolved");

    let client = RasClient::new(&config.server, config.retry.to_retry_config())
        .context("failed to create the API client")?;
    let mut console = StdoutConsole;

    match cli.command {
        Commands::Runs { action } => match action {
            RunsAction::Get(args) => {
                let criteria = RunsCriteria {
                    run_name: args.name,
                    age: args.age,
                    requestor: args.requestor,
                    results: args.result,
                    active_only: args.active,
                    group: args.group,
                    tags: args.tags,
                };
                rasctl::runs::get::get_runs(
                    &client,
                    &criteria,
                    &args.format,
                    chrono::Utc::now(),
                    &mut console,
                )
                .await?;
            }
            RunsAction::Cancel { name, group } => {
                if name.is_none() && group.is_none() {
                    anyhow::bail!("either --name or --group must be given");
                }
                rasctl::runs::cancel::cancel_runs(
                    &client,
                    name.as_deref(),
                    group.as_deref(),
                    config.cancel.on_ambiguous_run_name,
                    &mut console,
                )
                .await?;
            }
        },
    }

    Ok(())
}
