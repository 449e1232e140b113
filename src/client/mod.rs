//! HTTP clients for the link store and blob publish endpoints.
//!
//! Both clients swallow transport failures and fall back to something local:
//! the link store to the [`LocalCache`](crate::local_cache::LocalCache), the
//! blob publisher to the inline data URI. Callers only ever see which path
//! was taken, never the failure itself.

pub mod blob;
pub mod links;

pub use blob::{BlobPublisher, ImageValue};
pub use links::{HttpLinkStore, LinkStore, SaveOutcome};

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("unexpected response: {0}")]
    Response(String),
}

/// Shared client with the configured per-request timeout.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, TransportError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Turn a non-2xx response into [`TransportError::Status`], keeping the
/// `{error}` message when the body has one.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);
    Err(TransportError::Status { status, message })
}
