//! Client options: decorators around the transport chain.
//!
//! A [`ClientOption`] receives the transport built so far and returns the one
//! that replaces it. [`crate::Client`] applies options in order, so the
//! option applied last is the outermost wrapper and sees an outbound request
//! first. Put [`verbose_log`] at the front of the list to have it observe the
//! headers every later option adds.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Tracing target used for HTTP traffic logs.
pub const TRAFFIC_TARGET: &str = "settle_api::traffic";

/// Environment variable that switches on traffic logging.
pub const DEBUG_ENV: &str = "DEBUG";

/// Wraps (or replaces) the transport built so far.
pub type ClientOption = Box<dyn FnOnce(Arc<dyn Transport>) -> Arc<dyn Transport> + Send>;

/// Adds a fixed header to every request.
pub fn add_header(name: impl Into<String>, value: impl Into<String>) -> ClientOption {
    let value = value.into();
    add_header_fn(name, move || value.clone())
}

/// Adds a header whose value is computed on every request.
pub fn add_header_fn<F>(name: impl Into<String>, value: F) -> ClientOption
where
    F: Fn() -> String + Send + Sync + 'static,
{
    let name = name.into();
    Box::new(move |inner| {
        Arc::new(HeaderTransport {
            name,
            value: Box::new(value),
            inner,
        })
    })
}

/// Discards the transport built so far and uses `transport` instead.
pub fn replace_transport(transport: Arc<dyn Transport>) -> ClientOption {
    Box::new(move |_| transport)
}

/// Logs every round trip.
///
/// Request line, status and latency are always logged. With `log_traffic`
/// the headers and inspectable bodies (see [`inspectable_mime_type`]) are
/// logged as well.
pub fn verbose_log(log_traffic: bool) -> ClientOption {
    Box::new(move |inner| Arc::new(VerboseLog { inner, log_traffic }))
}

/// Builds [`verbose_log`] from the `DEBUG` environment variable.
///
/// Returns `None` when `DEBUG` is unset or empty. Traffic (headers and
/// bodies) is logged when the value contains `api`.
pub fn verbose_log_from_env() -> Option<ClientOption> {
    verbose_log_for(std::env::var(DEBUG_ENV).ok().as_deref())
}

fn verbose_log_for(debug: Option<&str>) -> Option<ClientOption> {
    let value = debug.filter(|v| !v.is_empty())?;
    Some(verbose_log(value.contains("api")))
}

/// Whether a body with this content type is worth printing.
///
/// True for `text/*` and for JSON types (`.../json` or `...+json`, with or
/// without parameters).
pub fn inspectable_mime_type(content_type: &str) -> bool {
    if content_type.starts_with("text/") {
        return true;
    }
    let essence = content_type.split(';').next().unwrap_or_default();
    essence.ends_with("/json") || essence.ends_with("+json")
}

struct HeaderTransport {
    name: String,
    value: Box<dyn Fn() -> String + Send + Sync>,
    inner: Arc<dyn Transport>,
}

#[async_trait]
impl Transport for HeaderTransport {
    async fn send(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        let invalid = || ApiError::InvalidHeader {
            name: self.name.clone(),
        };
        let name = HeaderName::from_bytes(self.name.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(&(self.value)()).map_err(|_| invalid())?;
        request.headers.append(name, value);
        self.inner.send(request).await
    }
}

struct VerboseLog {
    inner: Arc<dyn Transport>,
    log_traffic: bool,
}

#[async_trait]
impl Transport for VerboseLog {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let method = request.method.clone();
        let url = request.url.clone();

        if self.log_traffic {
            tracing::info!(
                target: TRAFFIC_TARGET,
                %method,
                %url,
                headers = %render_headers(&request.headers),
                "request"
            );
            if let Some(body) = printable_body(request.content_type(), request.body.as_ref()) {
                tracing::info!(target: TRAFFIC_TARGET, %method, %url, %body, "request body");
            }
        }

        let started = Instant::now();
        let result = self.inner.send(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => {
                tracing::info!(
                    target: TRAFFIC_TARGET,
                    %method,
                    %url,
                    status = response.status.as_u16(),
                    elapsed_ms,
                    "response"
                );
                if self.log_traffic {
                    tracing::info!(
                        target: TRAFFIC_TARGET,
                        headers = %render_headers(&response.headers),
                        "response headers"
                    );
                    if let Some(body) = printable_body(response.content_type(), Some(&response.body))
                    {
                        tracing::info!(target: TRAFFIC_TARGET, %body, "response body");
                    }
                }
            }
            Err(error) => {
                tracing::warn!(
                    target: TRAFFIC_TARGET,
                    %method,
                    %url,
                    elapsed_ms,
                    %error,
                    "request failed"
                );
            }
        }

        result
    }
}

fn render_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if name == AUTHORIZATION {
                "████████"
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            format!("{name}: {value}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn printable_body(content_type: Option<&str>, body: Option<&Bytes>) -> Option<String> {
    let body = body.filter(|b| !b.is_empty())?;
    if !inspectable_mime_type(content_type?) {
        return None;
    }
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(json) => serde_json::to_string_pretty(&json).ok(),
        Err(_) => Some(String::from_utf8_lossy(body).into_owned()),
    }
}
