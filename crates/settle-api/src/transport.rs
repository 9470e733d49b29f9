//! The transport layer every request travels through.
//!
//! A [`Transport`] turns an [`ApiRequest`] into a fully buffered
//! [`ApiResponse`]. The client owns a chain of transports: decorators from
//! [`crate::options`] wrap one another around an [`HttpTransport`] at the
//! bottom.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};

use crate::error::ApiResult;

/// Content type attached to every request the client issues.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// An outbound HTTP request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Encoded body, if any.
    pub body: Option<Bytes>,
}

impl ApiRequest {
    /// Creates a JSON request with no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        Self {
            method,
            url: url.into(),
            headers,
            body: None,
        }
    }

    /// Attaches an already encoded body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the request's `Content-Type`, if it is valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body bytes.
    pub body: Bytes,
}

impl ApiResponse {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Sets the `Content-Type` header.
    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self
    }

    /// Returns the response's `Content-Type`, if it is valid UTF-8.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

/// Sends a request and buffers the response.
///
/// Implementations must not interpret status codes; turning non-2xx
/// responses into errors is the client's job.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the round trip.
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse>;
}

/// The bottom of every transport chain: a plain `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport with `reqwest`'s default settings.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ApiError::Transport`] if the TLS backend cannot be
    /// initialized.
    pub fn new() -> ApiResult<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let mut builder = self
            .http
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
