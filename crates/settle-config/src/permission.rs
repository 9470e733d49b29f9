//! Repository permission levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission granted to a collaborator or team on a repository.
///
/// Listed from least to most privileged. `read` and `write` are accepted as
/// aliases of `pull` and `push`; GitHub always receives the canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Read and clone.
    #[serde(alias = "read")]
    Pull,
    /// Manage issues and pull requests without write access.
    Triage,
    /// Read and write.
    #[serde(alias = "write")]
    Push,
    /// Manage the repository without destructive access.
    Maintain,
    /// Full control.
    Admin,
}

impl Permission {
    /// Name used by the GitHub API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Pull => "pull",
            Permission::Triage => "triage",
            Permission::Push => "push",
            Permission::Maintain => "maintain",
            Permission::Admin => "admin",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
