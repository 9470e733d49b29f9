//! The capability reconcilers program against.
//!
//! [`GitHubApi`] is deliberately untyped (`serde_json::Value` in and out) so
//! it stays object safe and can be backed by an in-memory fake in tests.
//! [`GitHubApiExt`] layers the typed helpers on top.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// REST and GraphQL access to GitHub.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Issues a REST call against a path relative to the API origin.
    ///
    /// Returns `Ok(None)` for `204 No Content`, otherwise the decoded JSON
    /// body.
    async fn rest(&self, method: Method, path: &str, body: Option<Value>)
        -> ApiResult<Option<Value>>;

    /// Issues a GraphQL operation and returns its `data` member.
    async fn graphql(&self, query: &str, variables: Value) -> ApiResult<Value>;
}

/// Typed helpers available on every [`GitHubApi`].
#[async_trait]
pub trait GitHubApiExt: GitHubApi {
    /// `GET` a path and decode the body. `204 No Content` yields
    /// `T::default()` without decoding.
    async fn fetch<T>(&self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned + Default + Send,
    {
        match self.rest(Method::GET, path, None).await? {
            Some(value) => decode(value),
            None => Ok(T::default()),
        }
    }

    /// Sends a JSON body and ignores whatever comes back.
    async fn send_json<B>(&self, method: Method, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + Sync,
    {
        let body = serde_json::to_value(body).map_err(ApiError::Encode)?;
        self.rest(method, path, Some(body)).await?;
        Ok(())
    }

    /// `DELETE` a path.
    async fn remove(&self, path: &str) -> ApiResult<()> {
        self.rest(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Runs a GraphQL query and decodes its `data`.
    async fn query<T>(&self, query: &str, variables: Value) -> ApiResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let data = self.graphql(query, variables).await?;
        decode(data)
    }

    /// Runs a GraphQL mutation, discarding its `data`.
    async fn mutate(&self, mutation: &str, variables: Value) -> ApiResult<()> {
        self.graphql(mutation, variables).await?;
        Ok(())
    }
}

impl<A: GitHubApi + ?Sized> GitHubApiExt for A {}

fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(ApiError::Decode)
}
