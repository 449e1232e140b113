//! Filesystem persistence behind the endpoints.
//!
//! ```text
//! <data_dir>/
//! ├── links.json                 # {"links": [...]}, replaced whole on every save
//! └── blobs/
//!     └── thumbnails/
//!         └── 1714557600000-3f2a9c1b.jpg
//! ```
//!
//! Writes are serialized with a mutex and land through a temporary file plus
//! rename, so readers never see a half-written list.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::ServerError;
use crate::types::{Collection, LinksPayload};

const LINKS_FILE: &str = "links.json";
const BLOBS_DIR: &str = "blobs";

pub struct FileLinkRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLinkRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(LINKS_FILE),
            write_lock: Mutex::new(()),
        }
    }

    /// Stored collection, newest id first. A missing file is an empty list.
    pub async fn load(&self) -> Result<Collection, ServerError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let payload: LinksPayload = serde_json::from_str(&content)?;
        let mut links = payload.links;
        links.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(links)
    }

    /// Replace the stored collection.
    pub async fn replace(&self, links: Collection) -> Result<(), ServerError> {
        let json = serde_json::to_string_pretty(&LinksPayload { links })?;
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Read a seed file: either a bare array or `{"links": [...]}`.
pub async fn read_seed(path: &Path) -> Result<Collection, ServerError> {
    let content = tokio::fs::read_to_string(path).await?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let links = match value {
        serde_json::Value::Object(mut map) => map.remove("links").unwrap_or_default(),
        other => other,
    };
    Ok(serde_json::from_value(links)?)
}

/// Content type for a blob, from its extension.
pub fn content_type_for(ext: &str) -> String {
    if ext == "jpg" {
        "image/jpeg".to_string()
    } else {
        format!("image/{ext}")
    }
}

/// Extension of a suggested filename, `jpg` when it has none usable.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string())
}

/// A blob key is a relative path of plain segments.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        })
}

/// Uploaded blobs, served back under `/blobs/<key>`.
pub struct FileBlobStore {
    root: PathBuf,
    public_url: String,
}

/// A blob read back from disk.
pub struct StoredBlob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileBlobStore {
    pub fn new(data_dir: &Path, public_url: &str) -> Self {
        Self {
            root: data_dir.join(BLOBS_DIR),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fresh key for an upload: `thumbnails/<millis>-<random>.<ext>`.
    pub fn new_key(filename: &str) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!(
            "thumbnails/{}-{}.{}",
            Utc::now().timestamp_millis(),
            &random[..8],
            extension_of(filename)
        )
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/blobs/{}", self.public_url, key)
    }

    /// Store bytes under a fresh key. Returns the key.
    pub async fn put(&self, filename: &str, bytes: &[u8]) -> Result<String, ServerError> {
        let key = Self::new_key(filename);
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::info!(%key, size = bytes.len(), "stored blob");
        Ok(key)
    }

    /// Read a blob. `None` for unknown or malformed keys.
    pub async fn get(&self, key: &str) -> Result<Option<StoredBlob>, ServerError> {
        if !is_valid_key(key) {
            return Ok(None);
        }
        let bytes = match tokio::fs::read(self.root.join(key)).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(StoredBlob {
            content_type: content_type_for(&extension_of(key)),
            bytes,
        }))
    }
}
