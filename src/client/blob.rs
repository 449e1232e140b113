//! Blob publishing client.
//!
//! Sends a prepared thumbnail to the blob endpoint as
//! `{"filename": "...", "data": "data:image/jpeg;base64,..."}` and expects
//! `{"url": "..."}` back. When that fails, the data URI itself becomes the
//! entry's image value, so a card always has its picture.

use serde::{Deserialize, Serialize};

use super::{TransportError, build_http_client, check_status};
use crate::config::ClientConfig;

#[derive(Serialize)]
struct UploadRequest<'a> {
    filename: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

/// What ended up in the entry's `image` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageValue {
    /// Stable public URL from the blob store.
    Published(String),
    /// The data URI, embedded because publishing failed.
    Inline(String),
}

impl ImageValue {
    pub fn is_published(&self) -> bool {
        matches!(self, ImageValue::Published(_))
    }

    pub fn into_string(self) -> String {
        match self {
            ImageValue::Published(s) | ImageValue::Inline(s) => s,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlobPublisher {
    http: reqwest::Client,
    endpoint: String,
}

impl BlobPublisher {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        Ok(Self {
            http: build_http_client(config.timeout())?,
            endpoint: config.blob_endpoint.clone(),
        })
    }

    /// Publish a data URI and return its public URL.
    pub async fn publish(&self, data_uri: &str, filename: &str) -> Result<String, TransportError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&UploadRequest {
                filename,
                data: data_uri,
            })
            .send()
            .await?;
        let body: UploadResponse = check_status(response).await?.json().await?;
        match body.url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(TransportError::Response("upload response has no url".into())),
        }
    }

    /// Publish, falling back to the data URI on any failure.
    pub async fn publish_or_inline(&self, data_uri: &str, filename: &str) -> ImageValue {
        match self.publish(data_uri, filename).await {
            Ok(url) => {
                tracing::info!(%url, "published thumbnail");
                ImageValue::Published(url)
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "blob publish failed, embedding image inline");
                ImageValue::Inline(data_uri.to_string())
            }
        }
    }
}
