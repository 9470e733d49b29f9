//! Team access.

use serde::{Deserialize, Serialize};
use settle_api::{GitHubApi, GitHubApiExt, Method};
use settle_config::{Permission, RepoConfig};

use crate::error::Result;
use crate::plan::plan;

/// Teams listed per request. Further pages are not requested.
pub const PAGE_SIZE: u32 = 100;

/// A team with access to the repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObservedTeam {
    pub name: String,
    pub slug: String,
}

#[derive(Serialize)]
struct PermissionBody {
    permission: Permission,
}

/// What changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamReport {
    /// Team names sent a `PUT`.
    pub granted: Vec<String>,
    /// Slugs of teams removed.
    pub removed: Vec<String>,
}

/// Converge the repository's teams onto `config.teams`.
///
/// The configured name is used as the slug when granting. Teams whose
/// name is not configured lose access.
pub async fn reconcile(api: &dyn GitHubApi, org: &str, config: &RepoConfig) -> Result<TeamReport> {
    let repo = config.name();
    let mut report = TeamReport::default();

    for wanted in &config.teams {
        tracing::debug!(repo, team = %wanted.name, permission = %wanted.permission, "granting team");
        api.send_json(
            Method::PUT,
            &format!("orgs/{org}/teams/{}/repos/{org}/{repo}", wanted.name),
            &PermissionBody {
                permission: wanted.permission,
            },
        )
        .await?;
        report.granted.push(wanted.name.clone());
    }

    let observed: Vec<ObservedTeam> = api
        .fetch(&format!("repos/{org}/{repo}/teams?per_page={PAGE_SIZE}"))
        .await?;
    let plan = plan(
        &config.teams,
        &observed,
        |t| t.name.as_str(),
        |t| t.name.as_str(),
        |_| false,
    );

    for stale in plan.delete {
        tracing::info!(repo, team = %stale.name, slug = %stale.slug, "removing team");
        api.remove(&format!("orgs/{org}/teams/{}/repos/{org}/{repo}", stale.slug))
            .await?;
        report.removed.push(stale.slug.clone());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{Call, FakeGitHub};
    use settle_config::{RepositorySettings, TeamConfig};

    fn config(teams: &[(&str, Permission)]) -> RepoConfig {
        RepoConfig {
            repository: RepositorySettings {
                name: "api".into(),
                ..RepositorySettings::default()
            },
            collaborators: vec![],
            teams: teams
                .iter()
                .map(|(name, permission)| TeamConfig {
                    name: name.to_string(),
                    permission: *permission,
                })
                .collect(),
            branches: vec![],
        }
    }

    #[tokio::test]
    async fn test_grant_and_remove() {
        let github = FakeGitHub::new("acme")
            .with_repo("api")
            .with_team("api", "backend", "backend")
            .with_team("api", "Old Team", "old-team");

        let report = reconcile(&github, "acme", &config(&[("backend", Permission::Maintain)]))
            .await
            .unwrap();

        assert_eq!(report.granted, vec!["backend"]);
        assert_eq!(report.removed, vec!["old-team"]);
        assert_eq!(
            github.calls(),
            vec![
                Call::rest("PUT", "orgs/acme/teams/backend/repos/acme/api"),
                Call::rest("GET", "repos/acme/api/teams?per_page=100"),
                Call::rest("DELETE", "orgs/acme/teams/old-team/repos/acme/api"),
            ]
        );
        let body = github
            .last_body("PUT", "orgs/acme/teams/backend/repos/acme/api")
            .unwrap();
        assert_eq!(body["permission"], "maintain");
    }

    #[tokio::test]
    async fn test_new_team_is_added() {
        let github = FakeGitHub::new("acme").with_repo("api");

        reconcile(&github, "acme", &config(&[("frontend", Permission::Push)]))
            .await
            .unwrap();

        assert_eq!(github.teams("api"), vec!["frontend"]);
        assert!(github.calls_matching("DELETE").is_empty());
    }

    #[tokio::test]
    async fn test_empty_config_removes_every_team() {
        let github = FakeGitHub::new("acme")
            .with_repo("api")
            .with_team("api", "a", "a")
            .with_team("api", "b", "b");

        let report = reconcile(&github, "acme", &config(&[])).await.unwrap();

        assert_eq!(report.removed, vec!["a", "b"]);
        assert!(github.teams("api").is_empty());
    }
}
