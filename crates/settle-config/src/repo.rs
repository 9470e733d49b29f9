//! The desired state of one repository.
//!
//! One YAML document per repository:
//!
//! ```yaml
//! repository:
//!   name: api
//!   description: Public API
//!   private: true
//!   has_issues: true
//!   allow_squash_merge: true
//!   delete_branch_on_merge: true
//! collaborators:
//!   - username: alice
//!     permission: push
//! teams:
//!   - name: backend
//!     permission: maintain
//! branches:
//!   - name: main
//!     requiresApprovingReviews: true
//!     requiredApprovingReviewCount: 2
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::permission::Permission;

/// Desired configuration for a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Repository metadata.
    pub repository: RepositorySettings,
    /// Direct collaborators, in file order.
    #[serde(default)]
    pub collaborators: Vec<CollaboratorConfig>,
    /// Teams with access, in file order.
    #[serde(default)]
    pub teams: Vec<TeamConfig>,
    /// Branch-protection rules, in file order.
    #[serde(default)]
    pub branches: Vec<BranchConfig>,
}

/// Repository metadata. Unset flags default to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    pub name: String,
    pub description: String,
    pub homepage: String,
    pub private: bool,
    pub has_issues: bool,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub allow_squash_merge: bool,
    pub allow_merge_commit: bool,
    pub allow_rebase_merge: bool,
    pub delete_branch_on_merge: bool,
}

/// A direct collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorConfig {
    pub username: String,
    pub permission: Permission,
}

/// A team granted access. `name` doubles as the team slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub name: String,
    pub permission: Permission,
}

/// A branch-protection rule, keyed by its branch name pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BranchConfig {
    /// Branch name pattern (`main`, `release/*`).
    pub name: String,
    pub required_approving_review_count: u32,
    pub requires_status_checks: bool,
    pub required_status_check_contexts: Vec<String>,
    pub requires_approving_reviews: bool,
    pub requires_code_owner_reviews: bool,
    pub requires_commit_signatures: bool,
    pub requires_strict_status_checks: bool,
    pub restricts_pushes: bool,
    pub is_admin_enforced: bool,
    pub dismisses_stale_reviews: bool,
    /// Node IDs of actors allowed to push when `restricts_pushes` is set.
    pub push_actor_ids: Vec<String>,
}

impl RepoConfig {
    /// Parse and validate a repository document. `origin` is only used in
    /// error messages.
    pub fn parse(yaml: &str, origin: &Path) -> Result<Self> {
        let config: RepoConfig = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Yaml {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.repository.name
    }

    /// Check the document describes a state GitHub can converge to.
    pub fn validate(&self, origin: &Path) -> Result<()> {
        let invalid = |reason: String| ConfigError::Invalid {
            path: origin.to_path_buf(),
            reason,
        };

        if self.repository.name.trim().is_empty() {
            return Err(invalid("repository name is required".into()));
        }

        if let Some(dup) = first_duplicate(self.collaborators.iter().map(|c| c.username.as_str())) {
            return Err(invalid(format!("collaborator '{dup}' is listed twice")));
        }
        if self.collaborators.iter().any(|c| c.username.is_empty()) {
            return Err(invalid("collaborator username must not be empty".into()));
        }

        if let Some(dup) = first_duplicate(self.teams.iter().map(|t| t.name.as_str())) {
            return Err(invalid(format!("team '{dup}' is listed twice")));
        }
        if self.teams.iter().any(|t| t.name.is_empty()) {
            return Err(invalid("team name must not be empty".into()));
        }

        if self.branches.iter().any(|b| b.name.is_empty()) {
            return Err(invalid("branch pattern must not be empty".into()));
        }
        if let Some(dup) = first_duplicate(self.branches.iter().map(|b| b.name.as_str())) {
            return Err(invalid(format!("branch pattern '{dup}' is listed twice")));
        }

        Ok(())
    }
}

fn first_duplicate<'a>(keys: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    keys.into_iter().find(|key| !seen.insert(*key))
}
