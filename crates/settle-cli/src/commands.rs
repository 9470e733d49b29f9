//! The `settle` run: load repository files and converge each of them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use settle_api::{
    add_header, add_header_fn, verbose_log_from_env, Client, ClientOption, Endpoints, GitHubApi,
    RateLimit, RateLimitUsage,
};
use settle_config::{load_file, EnvTokenSource, Settings, StaticToken, TokenSource};
use settle_reconcile::Reconciler;

/// Media type that enables the branch-protection GraphQL preview.
pub const ACCEPT: &str = "application/vnd.github.antiope-preview+json";

/// Inputs gathered from flags and environment.
#[derive(Debug, Default)]
pub struct RunArgs {
    pub org: Option<String>,
    pub token: Option<String>,
    pub config_dir: Option<PathBuf>,
    pub files: Vec<PathBuf>,
    pub settings: Option<PathBuf>,
}

/// `User-Agent` sent with every request.
pub fn user_agent() -> String {
    format!("settle {}", env!("CARGO_PKG_VERSION"))
}

/// Decorators for the API client. Traffic logging, when enabled, comes
/// first so it sees every header added after it.
pub fn client_options(token: String) -> Vec<ClientOption> {
    let mut options = Vec::new();
    if let Some(verbose) = verbose_log_from_env() {
        options.push(verbose);
    }
    options.push(add_header_fn("Authorization", move || format!("token {token}")));
    options.push(add_header("User-Agent", user_agent()));
    options.push(add_header("Accept", ACCEPT));
    options
}

/// Apply every configured repository file against api.github.com.
pub async fn run(args: RunArgs) -> Result<()> {
    run_against(args, Endpoints::default()).await
}

pub(crate) async fn run_against(args: RunArgs, endpoints: Endpoints) -> Result<()> {
    let settings = Settings::load(args.settings.as_deref())?;
    let org = settings.resolve_org(args.org)?;
    let source = settings.resolve_source(args.files, args.config_dir);

    let token_source: Box<dyn TokenSource> = match args.token {
        Some(token) => Box::new(StaticToken::new(token)),
        None => Box::new(EnvTokenSource::default()),
    };
    let token = token_source.auth_token()?;

    let client = Client::with_endpoints(endpoints, client_options(token))
        .context("failed to build GitHub client")?;

    let paths = source.paths()?;
    if paths.is_empty() {
        tracing::warn!(?source, "no repository files found");
    }

    let before = rate_limit(&client).await;
    let reconciler = Reconciler::new(&client, org);

    for path in &paths {
        let config = load_file(path)?;
        let report = reconciler
            .apply(&config)
            .await
            .with_context(|| format!("failed to apply '{}'", path.display()))?;

        tracing::info!(
            repo = %report.repository,
            collaborators_granted = report.collaborators.granted.len(),
            collaborators_removed = report.collaborators.removed.len(),
            teams_granted = report.teams.granted.len(),
            teams_removed = report.teams.removed.len(),
            rules_created = report.branch_protection.created.len(),
            rules_updated = report.branch_protection.updated.len(),
            rules_deleted = report.branch_protection.deleted.len(),
            "repository converged"
        );
    }

    if let (Some(before), Some(after)) = (before, rate_limit(&client).await) {
        let usage = RateLimitUsage::between(&before, &after);
        tracing::info!(
            core_api_calls = usage.core_calls,
            graphql_api_calls = usage.graphql_calls,
            core_remaining = usage.core_remaining,
            graphql_remaining = usage.graphql_remaining,
            combined_remaining = usage.combined_remaining,
            "rate limit stats"
        );
    }

    Ok(())
}

async fn rate_limit(api: &dyn GitHubApi) -> Option<RateLimit> {
    match RateLimit::fetch(api).await {
        Ok(limit) => Some(limit),
        Err(error) => {
            tracing::warn!(%error, "could not read rate limit");
            None
        }
    }
}
