mod display;

use alertreport_core::config::{
    parse_features, ReportConfig, Scope, DEFAULT_API_URL, DEFAULT_SERVER_URL,
};
use alertreport_core::runner::run_report_with;
use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "alertreport",
    version,
    about = "Export GitHub security alerts to CSV reports",
    long_about = "Collect secret scanning, code scanning and Dependabot alerts for an enterprise, \
organization or repository and write one CSV report per feature.\n\n\
Every option can also be set through the environment variables used by GitHub Actions."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch alerts and write CSV reports
    Report(ReportArgs),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// REST API root (use https://HOST/api/v3 for Enterprise Server)
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Web root of the server, used for the stafftools repository report
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,

    /// Access token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "GITHUB_PAT", hide_env_values = true)]
    token: Option<String>,

    /// Report scope (enterprise, organization, repository)
    #[arg(long, env = "GITHUB_REPORT_SCOPE", default_value = "repository")]
    scope: String,

    /// Enterprise slug, organization name or owner/repo (falls back to GITHUB_REPOSITORY)
    #[arg(long, env = "SCOPE_NAME")]
    scope_name: Option<String>,

    /// Comma-separated features (secretscanning, codescanning, dependabot) or "all"
    #[arg(long, env = "FEATURES", default_value = "all")]
    features: String,

    /// Directory for the CSV reports
    #[arg(short, long, env = "REPORT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Join repository custom properties into the reports
    #[arg(
        long,
        env = "INCLUDE_PROPERTIES",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = FalseyValueParser::new()
    )]
    include_properties: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Report(args) => cmd_report(args).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "alertreport", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("alertreport={level},alertreport_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn cmd_report(args: ReportArgs) -> Result<()> {
    let config = build_config(
        args,
        std::env::var("GITHUB_TOKEN").ok(),
        std::env::var("GITHUB_REPOSITORY").ok(),
    )?;
    debug!(?config, "Resolved configuration");

    display::print_banner(&config);

    let outcomes = run_report_with(&config, display::print_outcome)
        .await
        .context("Security report failed")?;

    display::print_summary(&outcomes);
    Ok(())
}

/// Build the run configuration, applying the GitHub Actions fallbacks.
fn build_config(
    args: ReportArgs,
    fallback_token: Option<String>,
    fallback_repository: Option<String>,
) -> Result<ReportConfig> {
    let scope: Scope = args.scope.parse()?;

    let token = args
        .token
        .filter(|t| !t.trim().is_empty())
        .or(fallback_token)
        .context("No token provided. Set GITHUB_PAT or GITHUB_TOKEN, or pass --token")?;

    let scope_name = args
        .scope_name
        .filter(|n| !n.trim().is_empty())
        .or(fallback_repository)
        .context(
            "No scope name provided. Set SCOPE_NAME or GITHUB_REPOSITORY, or pass --scope-name",
        )?;

    let mut config = ReportConfig::new(token, scope, scope_name)?
        .with_api_url(&args.api_url)?
        .with_server_url(&args.server_url)?;

    config.features = parse_features(Some(&args.features)).features;
    config.output_dir = args.output_dir;
    config.include_properties = args.include_properties;
    config.request_timeout = Duration::from_secs(args.timeout_secs);

    config.validate()?;
    Ok(config)
}
