//! Settle CLI - apply declared settings to GitHub repositories.

use std::path::PathBuf;

use clap::Parser;

mod commands;
mod logging;

use logging::LogFormat;

/// Settle - declarative GitHub repository settings
///
/// Reads one YAML file per repository and converges its metadata,
/// collaborators, teams and branch-protection rules.
#[derive(Parser, Debug)]
#[command(name = "settle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// GitHub organization owning the repositories
    #[arg(long, env = "GITHUB_ORG")]
    org: Option<String>,

    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory of repository files [default: repo_config]
    #[arg(long, env = "SETTLE_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Repository files to apply instead of the config directory
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Settings file [default: ~/.settle.yaml]
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_format);

    let args = commands::RunArgs {
        org: cli.org,
        token: cli.token,
        config_dir: cli.config_dir,
        files: cli.files,
        settings: cli.settings,
    };

    if let Err(e) = commands::run(args).await {
        tracing::error!(error = %format!("{e:#}"), "run failed");
        std::process::exit(1);
    }
}
