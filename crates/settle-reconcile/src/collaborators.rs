//! Direct collaborators.
//!
//! Every desired collaborator is (re)granted with a `PUT`, which GitHub
//! treats as an upsert. Human collaborators missing from the config are then
//! removed, except organization administrators.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use settle_api::{GitHubApi, GitHubApiExt, Method};
use settle_config::{CollaboratorConfig, Permission, RepoConfig};

use crate::error::Result;
use crate::plan::plan;

/// Collaborators listed per request. Larger teams are not paged.
pub const PAGE_SIZE: u32 = 100;

/// A collaborator as GitHub reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObservedCollaborator {
    pub login: String,
    /// Account type: `User`, `Bot` or `Organization`.
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ObservedCollaborator {
    fn is_user(&self) -> bool {
        self.kind == "User"
    }
}

#[derive(Debug, Deserialize)]
struct Member {
    login: String,
}

#[derive(Serialize)]
struct PermissionBody {
    permission: Permission,
}

/// What changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollaboratorReport {
    /// Logins sent a `PUT`.
    pub granted: Vec<String>,
    /// Logins removed.
    pub removed: Vec<String>,
}

/// Converge the repository's collaborators onto `config.collaborators`.
pub async fn reconcile(api: &dyn GitHubApi, org: &str, config: &RepoConfig) -> Result<CollaboratorReport> {
    let repo = config.name();
    let mut report = CollaboratorReport::default();

    for wanted in &config.collaborators {
        grant(api, org, repo, wanted).await?;
        report.granted.push(wanted.username.clone());
    }

    let admins = organization_admins(api, org).await?;
    let observed: Vec<ObservedCollaborator> = api
        .fetch(&format!("repos/{org}/{repo}/collaborators?per_page={PAGE_SIZE}"))
        .await?;
    let observed: Vec<_> = observed
        .into_iter()
        .filter(ObservedCollaborator::is_user)
        .collect();

    let plan = plan(
        &config.collaborators,
        &observed,
        |c| c.username.as_str(),
        |c| c.login.as_str(),
        |c| admins.contains(c.login.as_str()),
    );

    for stale in plan.delete {
        tracing::info!(repo, login = %stale.login, "removing collaborator");
        api.remove(&format!("repos/{org}/{repo}/collaborators/{}", stale.login))
            .await?;
        report.removed.push(stale.login.clone());
    }

    Ok(report)
}

async fn grant(api: &dyn GitHubApi, org: &str, repo: &str, wanted: &CollaboratorConfig) -> Result<()> {
    tracing::debug!(repo, login = %wanted.username, permission = %wanted.permission, "granting collaborator");
    api.send_json(
        Method::PUT,
        &format!("repos/{org}/{repo}/collaborators/{}", wanted.username),
        &PermissionBody {
            permission: wanted.permission,
        },
    )
    .await?;
    Ok(())
}

/// Logins of the organization's administrators.
pub async fn organization_admins(api: &dyn GitHubApi, org: &str) -> Result<HashSet<String>> {
    let members: Vec<Member> = api
        .fetch(&format!("orgs/{org}/members?role=admin&per_page={PAGE_SIZE}"))
        .await?;
    Ok(members.into_iter().map(|m| m.login).collect())
}
