//! Error types for the reconcile crate.

use settle_api::ApiError;
use thiserror::Error;

/// Errors that stop a repository from converging.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A REST or GraphQL call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The organization or repository does not exist, or the token cannot
    /// see it.
    #[error("repository '{org}/{name}' not found")]
    RepositoryNotFound { org: String, name: String },
}

/// Result type for reconcile operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
