//! Local key → JSON blob cache used when the remote endpoints are unreachable.
//!
//! # Design
//!
//! Each key is one file, `<dir>/<key>.json`, holding a small envelope:
//!
//! ```json
//! { "version": 1, "saved_at": "2024-05-01T10:00:00Z", "value": { ... } }
//! ```
//!
//! Reads are forgiving: a missing file, a parse failure or a version mismatch
//! all read as "no cached copy", so a damaged cache can never stop the app
//! from starting. Writes go to a temporary sibling first and are renamed into
//! place, so a crash mid-write leaves the previous copy intact. All file
//! access goes through `tokio::fs`, so the cache is safe to use from the
//! async link store client.
//!
//! The link collection lives under the fixed key [`LINKS_KEY`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use thiserror::Error;

/// Key under which the link collection is cached.
pub const LINKS_KEY: &str = "links";

/// Version of the envelope format. Bump this to ignore all existing files
/// when the format changes.
const CACHE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid cache key: {0:?}")]
    InvalidKey(String),
}

#[derive(Serialize, serde::Deserialize)]
struct Envelope<T> {
    version: u32,
    saved_at: DateTime<Utc>,
    value: T,
}

/// A directory of cached JSON values.
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Read a cached value. Returns `None` when there is no usable copy.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key).ok()?;
        let content = tokio::fs::read_to_string(&path).await.ok()?;
        let envelope: Envelope<T> = match serde_json::from_str(&content) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable cache file");
                return None;
            }
        };
        if envelope.version != CACHE_VERSION {
            return None;
        }
        Some(envelope.value)
    }

    /// Store a value, replacing any previous copy.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(&Envelope {
            version: CACHE_VERSION,
            saved_at: Utc::now(),
            value,
        })?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
