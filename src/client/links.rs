//! Link store client: whole-collection load and save.
//!
//! `load` never fails: a transport failure falls back to the cached copy, and
//! a missing cache reads as an empty collection. `save` never fails either: a
//! transport failure writes the collection to the cache and reports
//! [`SaveOutcome::SavedLocally`].

use async_trait::async_trait;
use serde::Deserialize;

use super::{TransportError, build_http_client, check_status};
use crate::config::ClientConfig;
use crate::local_cache::{LINKS_KEY, LocalCache};
use crate::types::{Collection, LinksPayload};

/// Where a save ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Remote,
    SavedLocally,
}

/// Whole-collection persistence. The editor is generic over this so it can
/// be driven by the HTTP client or an in-memory fake.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn load(&self) -> Collection;
    async fn save(&self, links: &Collection) -> SaveOutcome;
}

#[derive(Deserialize)]
struct SaveResponse {
    #[serde(default)]
    ok: bool,
}

/// [`LinkStore`] backed by the `/api/links` endpoint with a local fallback.
#[derive(Debug, Clone)]
pub struct HttpLinkStore {
    http: reqwest::Client,
    endpoint: String,
    cache: LocalCache,
}

impl HttpLinkStore {
    pub fn new(config: &ClientConfig, cache: LocalCache) -> Result<Self, TransportError> {
        Ok(Self {
            http: build_http_client(config.timeout())?,
            endpoint: config.links_endpoint.clone(),
            cache,
        })
    }

    /// GET the collection without any fallback.
    pub async fn fetch(&self) -> Result<Collection, TransportError> {
        let response = self.http.get(&self.endpoint).send().await?;
        let payload: LinksPayload = check_status(response).await?.json().await?;
        Ok(payload.links)
    }

    /// POST the collection without any fallback.
    pub async fn push(&self, links: &Collection) -> Result<(), TransportError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&LinksPayload {
                links: links.clone(),
            })
            .send()
            .await?;
        let body: SaveResponse = check_status(response).await?.json().await?;
        if !body.ok {
            return Err(TransportError::Response("save was not acknowledged".into()));
        }
        Ok(())
    }

    async fn cache_locally(&self, links: &Collection) {
        if let Err(e) = self.cache.put(LINKS_KEY, links).await {
            tracing::warn!(error = %e, "failed to write local cache");
        }
    }
}

#[async_trait]
impl LinkStore for HttpLinkStore {
    async fn load(&self) -> Collection {
        match self.fetch().await {
            Ok(links) => {
                tracing::debug!(count = links.len(), "loaded links from endpoint");
                self.cache_locally(&links).await;
                links
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "link store unreachable, using local cache");
                self.cache.get(LINKS_KEY).await.unwrap_or_default()
            }
        }
    }

    async fn save(&self, links: &Collection) -> SaveOutcome {
        match self.push(links).await {
            Ok(()) => {
                tracing::info!(count = links.len(), "saved links to endpoint");
                SaveOutcome::Remote
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "link store save failed, saving locally");
                self.cache_locally(links).await;
                SaveOutcome::SavedLocally
            }
        }
    }
}
