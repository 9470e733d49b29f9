//! # API Client
//!
//! The concrete [`GitHubApi`] implementation. It owns a transport chain built
//! from [`ClientOption`]s and normalizes both protocols into [`ApiError`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::GitHubApi;
use crate::error::{ApiError, ApiResult, GraphQlErrorEntry};
use crate::options::ClientOption;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// REST origin requests are resolved against.
pub const GITHUB_API_URL: &str = "https://api.github.com/";

/// The single GraphQL endpoint.
pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Where REST and GraphQL requests go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Origin REST paths are appended to.
    pub rest: String,
    /// GraphQL endpoint.
    pub graphql: String,
}

impl Endpoints {
    /// Endpoints of a GitHub-compatible server rooted at `base`.
    ///
    /// Useful for pointing the client at a mock server.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            rest: format!("{base}/"),
            graphql: format!("{base}/graphql"),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            rest: GITHUB_API_URL.to_string(),
            graphql: GITHUB_GRAPHQL_URL.to_string(),
        }
    }
}

/// GitHub API client.
///
/// Cheap to clone; clones share the transport chain.
///
/// # Examples
///
/// ```rust,ignore
/// use settle_api::{add_header, Client, GitHubApiExt};
///
/// let client = Client::new(vec![add_header("Authorization", "token abc")])?;
/// let limits: settle_api::RateLimit = client.fetch("rate_limit").await?;
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
}

impl Client {
    /// Creates a client for api.github.com.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(options: Vec<ClientOption>) -> ApiResult<Self> {
        Self::with_endpoints(Endpoints::default(), options)
    }

    /// Creates a client for arbitrary endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn with_endpoints(endpoints: Endpoints, options: Vec<ClientOption>) -> ApiResult<Self> {
        let base: Arc<dyn Transport> = Arc::new(HttpTransport::new()?);
        Ok(Self::from_transport(base, endpoints, options))
    }

    /// Creates a client on top of an existing transport.
    pub fn from_transport(
        base: Arc<dyn Transport>,
        endpoints: Endpoints,
        options: Vec<ClientOption>,
    ) -> Self {
        let transport = options.into_iter().fold(base, |tr, option| option(tr));
        Self {
            transport,
            endpoints,
        }
    }

    fn rest_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoints.rest.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[async_trait]
impl GitHubApi for Client {
    async fn rest(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<Option<Value>> {
        let url = self.rest_url(path);
        let mut request = ApiRequest::new(method.clone(), &url);
        if let Some(body) = body {
            request = request.with_body(serde_json::to_vec(&body).map_err(ApiError::Encode)?);
        }

        let response = self.transport.send(request).await?;
        if !response.status.is_success() {
            return Err(http_error(method, url, &response));
        }
        if response.status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        serde_json::from_slice(&response.body)
            .map(Some)
            .map_err(ApiError::Decode)
    }

    async fn graphql(&self, query: &str, variables: Value) -> ApiResult<Value> {
        let url = self.endpoints.graphql.clone();
        let body = serde_json::to_vec(&json!({ "query": query, "variables": variables }))
            .map_err(ApiError::Encode)?;
        let request = ApiRequest::new(Method::POST, &url).with_body(body);

        let response = self.transport.send(request).await?;
        if !response.status.is_success() {
            return Err(http_error(Method::POST, url, &response));
        }

        let envelope: GraphQlEnvelope =
            serde_json::from_slice(&response.body).map_err(ApiError::Decode)?;
        match envelope.errors {
            Some(errors) if !errors.is_empty() => Err(ApiError::GraphQl { errors }),
            _ => Ok(envelope.data.unwrap_or(Value::Null)),
        }
    }
}

fn http_error(method: Method, url: String, response: &ApiResponse) -> ApiError {
    let message = match serde_json::from_slice::<ErrorBody>(&response.body) {
        Ok(parsed) => parsed.message,
        Err(_) => String::from_utf8_lossy(&response.body).into_owned(),
    };
    ApiError::Http {
        method,
        url,
        status: response.status.as_u16(),
        message,
    }
}
