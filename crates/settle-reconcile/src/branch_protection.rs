//! Branch-protection rules, managed through GraphQL.
//!
//! Rules are matched by pattern. A matched rule is updated in place with the
//! full desired policy; unmatched desired patterns are created and rules
//! whose pattern is no longer configured are deleted.

use serde::{Deserialize, Serialize};
use serde_json::json;
use settle_api::{ApiError, GitHubApi, GitHubApiExt};
use settle_config::{BranchConfig, RepoConfig};

use crate::error::{ReconcileError, Result};
use crate::plan::{plan, Step};

/// Rules fetched per repository. Further pages are not requested.
pub const PAGE_SIZE: u32 = 100;

const RULES_QUERY: &str = r#"
query($org: String!, $name: String!) {
  organization(login: $org) {
    repository(name: $name) {
      branchProtectionRules(first: 100) {
        nodes {
          id
          pattern
          requiredApprovingReviewCount
          requiredStatusCheckContexts
          requiresApprovingReviews
          requiresCodeOwnerReviews
          requiresCommitSignatures
          requiresStatusChecks
          requiresStrictStatusChecks
          restrictsPushes
          isAdminEnforced
          dismissesStaleReviews
        }
      }
    }
  }
}"#;

const CREATE_RULE_MUTATION: &str = r#"
mutation(
  $repositoryId: ID!,
  $pattern: String!,
  $isAdminEnforced: Boolean!,
  $dismissesStaleReviews: Boolean!,
  $requiredApprovingReviewCount: Int!,
  $requiresApprovingReviews: Boolean!,
  $requiresCodeOwnerReviews: Boolean!,
  $requiresCommitSignatures: Boolean!,
  $requiresStatusChecks: Boolean!,
  $requiresStrictStatusChecks: Boolean!,
  $restrictsPushes: Boolean!,
  $requiredStatusCheckContexts: [String!],
  $pushActorIds: [ID!]
) {
  createBranchProtectionRule(input: {
    repositoryId: $repositoryId,
    pattern: $pattern,
    isAdminEnforced: $isAdminEnforced,
    dismissesStaleReviews: $dismissesStaleReviews,
    requiredApprovingReviewCount: $requiredApprovingReviewCount,
    requiresApprovingReviews: $requiresApprovingReviews,
    requiresCodeOwnerReviews: $requiresCodeOwnerReviews,
    requiresCommitSignatures: $requiresCommitSignatures,
    requiresStatusChecks: $requiresStatusChecks,
    requiresStrictStatusChecks: $requiresStrictStatusChecks,
    restrictsPushes: $restrictsPushes,
    requiredStatusCheckContexts: $requiredStatusCheckContexts,
    pushActorIds: $pushActorIds
  }) {
    clientMutationId
  }
}"#;

const UPDATE_RULE_MUTATION: &str = r#"
mutation(
  $branchProtectionRuleId: ID!,
  $pattern: String!,
  $isAdminEnforced: Boolean!,
  $dismissesStaleReviews: Boolean!,
  $requiredApprovingReviewCount: Int!,
  $requiresApprovingReviews: Boolean!,
  $requiresCodeOwnerReviews: Boolean!,
  $requiresCommitSignatures: Boolean!,
  $requiresStatusChecks: Boolean!,
  $requiresStrictStatusChecks: Boolean!,
  $restrictsPushes: Boolean!,
  $requiredStatusCheckContexts: [String!],
  $pushActorIds: [ID!]
) {
  updateBranchProtectionRule(input: {
    branchProtectionRuleId: $branchProtectionRuleId,
    pattern: $pattern,
    isAdminEnforced: $isAdminEnforced,
    dismissesStaleReviews: $dismissesStaleReviews,
    requiredApprovingReviewCount: $requiredApprovingReviewCount,
    requiresApprovingReviews: $requiresApprovingReviews,
    requiresCodeOwnerReviews: $requiresCodeOwnerReviews,
    requiresCommitSignatures: $requiresCommitSignatures,
    requiresStatusChecks: $requiresStatusChecks,
    requiresStrictStatusChecks: $requiresStrictStatusChecks,
    restrictsPushes: $restrictsPushes,
    requiredStatusCheckContexts: $requiredStatusCheckContexts,
    pushActorIds: $pushActorIds
  }) {
    clientMutationId
  }
}"#;

const DELETE_RULE_MUTATION: &str = r#"
mutation($branchProtectionRuleId: ID!) {
  deleteBranchProtectionRule(input: { branchProtectionRuleId: $branchProtectionRuleId }) {
    clientMutationId
  }
}"#;

/// A rule as GitHub reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObservedRule {
    pub id: String,
    pub pattern: String,
}

#[derive(Deserialize)]
struct RulesData {
    organization: Option<RulesOrganization>,
}

#[derive(Deserialize)]
struct RulesOrganization {
    repository: Option<RulesRepository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RulesRepository {
    branch_protection_rules: RuleConnection,
}

#[derive(Deserialize)]
struct RuleConnection {
    #[serde(default)]
    nodes: Vec<ObservedRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RulePolicy<'a> {
    pattern: &'a str,
    required_approving_review_count: u32,
    requires_status_checks: bool,
    required_status_check_contexts: &'a [String],
    requires_approving_reviews: bool,
    requires_code_owner_reviews: bool,
    requires_commit_signatures: bool,
    requires_strict_status_checks: bool,
    restricts_pushes: bool,
    is_admin_enforced: bool,
    dismisses_stale_reviews: bool,
    push_actor_ids: &'a [String],
}

impl<'a> From<&'a BranchConfig> for RulePolicy<'a> {
    fn from(branch: &'a BranchConfig) -> Self {
        Self {
            pattern: &branch.name,
            required_approving_review_count: branch.required_approving_review_count,
            requires_status_checks: branch.requires_status_checks,
            required_status_check_contexts: &branch.required_status_check_contexts,
            requires_approving_reviews: branch.requires_approving_reviews,
            requires_code_owner_reviews: branch.requires_code_owner_reviews,
            requires_commit_signatures: branch.requires_commit_signatures,
            requires_strict_status_checks: branch.requires_strict_status_checks,
            restricts_pushes: branch.restricts_pushes,
            is_admin_enforced: branch.is_admin_enforced,
            dismisses_stale_reviews: branch.dismisses_stale_reviews,
            push_actor_ids: &branch.push_actor_ids,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateVariables<'a> {
    repository_id: &'a str,
    #[serde(flatten)]
    policy: RulePolicy<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateVariables<'a> {
    branch_protection_rule_id: &'a str,
    #[serde(flatten)]
    policy: RulePolicy<'a>,
}

/// What changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchProtectionReport {
    /// Patterns created.
    pub created: Vec<String>,
    /// IDs of rules updated.
    pub updated: Vec<String>,
    /// IDs of rules deleted.
    pub deleted: Vec<String>,
}

/// Fetch the first page of the repository's rules.
pub async fn fetch_rules(api: &dyn GitHubApi, org: &str, name: &str) -> Result<Vec<ObservedRule>> {
    let data: RulesData = api
        .query(RULES_QUERY, json!({ "org": org, "name": name }))
        .await?;

    let repository = data
        .organization
        .and_then(|organization| organization.repository)
        .ok_or_else(|| ReconcileError::RepositoryNotFound {
            org: org.to_string(),
            name: name.to_string(),
        })?;

    let rules = repository.branch_protection_rules.nodes;
    if rules.len() >= PAGE_SIZE as usize {
        tracing::warn!(repo = name, count = rules.len(), "only the first page of branch protection rules is managed");
    }
    Ok(rules)
}

/// Converge the repository's rules onto `config.branches`.
pub async fn reconcile(
    api: &dyn GitHubApi,
    org: &str,
    repository_id: &str,
    config: &RepoConfig,
) -> Result<BranchProtectionReport> {
    let repo = config.name();
    let observed = fetch_rules(api, org, repo).await?;
    let plan = plan(
        &config.branches,
        &observed,
        |b| b.name.as_str(),
        |r| r.pattern.as_str(),
        |_| false,
    );
    let mut report = BranchProtectionReport::default();

    for step in &plan.steps {
        match *step {
            Step::Update(wanted, rule) => {
                tracing::debug!(repo, pattern = %wanted.name, rule_id = %rule.id, "updating branch protection");
                let variables = UpdateVariables {
                    branch_protection_rule_id: &rule.id,
                    policy: wanted.into(),
                };
                api.mutate(UPDATE_RULE_MUTATION, encode(&variables)?).await?;
                report.updated.push(rule.id.clone());
            }
            Step::Create(wanted) => {
                tracing::info!(repo, pattern = %wanted.name, "creating branch protection");
                let variables = CreateVariables {
                    repository_id,
                    policy: wanted.into(),
                };
                api.mutate(CREATE_RULE_MUTATION, encode(&variables)?).await?;
                report.created.push(wanted.name.clone());
            }
        }
    }

    for stale in plan.delete {
        tracing::info!(repo, pattern = %stale.pattern, rule_id = %stale.id, "deleting branch protection");
        api.mutate(
            DELETE_RULE_MUTATION,
            json!({ "branchProtectionRuleId": stale.id }),
        )
        .await?;
        report.deleted.push(stale.id.clone());
    }

    Ok(report)
}

fn encode<T: Serialize>(variables: &T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(variables).map_err(ApiError::Encode)?)
}
