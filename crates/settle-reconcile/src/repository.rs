//! Repository metadata.
//!
//! Description, homepage and feature toggles go through GraphQL; visibility,
//! default branch and merge options go through REST. Both calls are sent on
//! every run.

use serde::{Deserialize, Serialize};
use serde_json::json;
use settle_api::{GitHubApi, GitHubApiExt, Method};
use settle_config::RepositorySettings;

use crate::error::{ReconcileError, Result};

/// Default branch written on every update.
pub const DEFAULT_BRANCH: &str = "master";

const REPOSITORY_ID_QUERY: &str = r#"
query($org: String!, $name: String!) {
  organization(login: $org) {
    repository(name: $name) {
      id
    }
  }
}"#;

const UPDATE_REPOSITORY_MUTATION: &str = r#"
mutation($id: ID!, $homepage: URI, $wiki: Boolean!, $projects: Boolean!, $issues: Boolean!, $description: String!) {
  updateRepository(input: {
    repositoryId: $id,
    homepageUrl: $homepage,
    hasWikiEnabled: $wiki,
    hasProjectsEnabled: $projects,
    hasIssuesEnabled: $issues,
    description: $description
  }) {
    clientMutationId
  }
}"#;

#[derive(Deserialize)]
struct RepositoryIdData {
    organization: Option<OrganizationNode>,
}

#[derive(Deserialize)]
struct OrganizationNode {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
struct RepositoryNode {
    id: String,
}

/// Body of `PATCH repos/{org}/{repo}`.
#[derive(Debug, Serialize)]
struct RestRepositoryUpdate {
    private: bool,
    default_branch: &'static str,
    allow_rebase_merge: bool,
    allow_squash_merge: bool,
    allow_merge_commit: bool,
    delete_branch_on_merge: bool,
}

/// Look up the repository's GraphQL node ID.
pub async fn fetch_repository_id(api: &dyn GitHubApi, org: &str, name: &str) -> Result<String> {
    let data: RepositoryIdData = api
        .query(REPOSITORY_ID_QUERY, json!({ "org": org, "name": name }))
        .await?;

    data.organization
        .and_then(|organization| organization.repository)
        .map(|repo| repo.id)
        .ok_or_else(|| ReconcileError::RepositoryNotFound {
            org: org.to_string(),
            name: name.to_string(),
        })
}

/// Push metadata: one GraphQL mutation, then one REST patch.
pub async fn update_repository(
    api: &dyn GitHubApi,
    org: &str,
    repository_id: &str,
    settings: &RepositorySettings,
) -> Result<()> {
    let homepage = Some(settings.homepage.as_str()).filter(|h| !h.is_empty());
    api.mutate(
        UPDATE_REPOSITORY_MUTATION,
        json!({
            "id": repository_id,
            "homepage": homepage,
            "issues": settings.has_issues,
            "wiki": settings.has_wiki,
            "projects": settings.has_projects,
            "description": settings.description,
        }),
    )
    .await?;

    let body = RestRepositoryUpdate {
        private: settings.private,
        default_branch: DEFAULT_BRANCH,
        allow_rebase_merge: settings.allow_rebase_merge,
        allow_squash_merge: settings.allow_squash_merge,
        allow_merge_commit: settings.allow_merge_commit,
        delete_branch_on_merge: settings.delete_branch_on_merge,
    };
    api.send_json(Method::PATCH, &format!("repos/{org}/{}", settings.name), &body)
        .await?;

    tracing::info!(repo = %settings.name, private = settings.private, "updated repository settings");
    Ok(())
}
