//! Application configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a user file overrides only the keys it sets.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [client]
//! links_endpoint = "http://127.0.0.1:8080/api/links"
//! blob_endpoint = "http://127.0.0.1:8080/api/upload"
//! timeout_secs = 10
//!
//! [cache]
//! dir = ".link-gallery-cache"
//!
//! [images]
//! max_width = 400           # Thumbnails wider than this are downsampled
//! quality = 75              # JPEG quality (1-100)
//!
//! [gallery]
//! title = "Links"
//! categories = ["game", "tool", "art"]
//! placeholder_image = "https://via.placeholder.com/400x180?text=No+Image"
//! date_format = "%Y/%m/%d"
//! empty_message = "No entries yet"
//!
//! [colors.light]           # same keys under [colors.dark]
//! background = "#ffffff"
//! text = "#111111"
//! text_muted = "#666666"
//! border = "#e0e0e0"
//! accent = "#ff7a59"
//!
//! [admin]
//! password_sha256 = ""      # hex SHA-256 of the admin secret
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! data_dir = "data"
//! public_url = ""         # empty: derived from the bound address
//! max_upload_bytes = 4500000
//! # seed_file = "fixtures/seed.json"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::imaging::{PrepareParams, Quality};

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Remote endpoints used by the CLI and editor.
    pub client: ClientConfig,
    /// Local fallback cache.
    pub cache: CacheConfig,
    /// Thumbnail preparation.
    pub images: ImagesConfig,
    /// Gallery rendering.
    pub gallery: GalleryConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Admin secret.
    pub admin: AdminConfig,
    /// Endpoint service.
    pub server: ServerConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.images.max_width == 0 {
            return Err(ConfigError::Validation(
                "images.max_width must be non-zero".into(),
            ));
        }
        if self.client.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "client.timeout_secs must be non-zero".into(),
            ));
        }
        if self.gallery.categories.is_empty() {
            return Err(ConfigError::Validation(
                "gallery.categories must not be empty".into(),
            ));
        }
        if StrftimeItems::new(&self.gallery.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Validation(format!(
                "gallery.date_format is not a valid format: {}",
                self.gallery.date_format
            )));
        }
        let digest = &self.admin.password_sha256;
        if !digest.is_empty()
            && (digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()))
        {
            return Err(ConfigError::Validation(
                "admin.password_sha256 must be 64 hex characters".into(),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "server.max_upload_bytes must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Remote endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Link store endpoint (`GET`/`POST` full collection).
    pub links_endpoint: String,
    /// Blob publish endpoint (`POST {filename, data}`).
    pub blob_endpoint: String,
    /// Per-request timeout. Expiry counts as a transport failure.
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            links_endpoint: "http://127.0.0.1:8080/api/links".to_string(),
            blob_endpoint: "http://127.0.0.1:8080/api/upload".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Local fallback cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: ".link-gallery-cache".to_string(),
        }
    }
}

/// Thumbnail preparation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Images wider than this are downsampled to exactly this width.
    pub max_width: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl ImagesConfig {
    pub fn prepare_params(&self) -> PrepareParams {
        PrepareParams {
            max_width: self.max_width,
            quality: Quality::new(self.quality),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_width: 400,
            quality: 75,
        }
    }
}

/// Gallery rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Page title.
    pub title: String,
    /// Categories offered in the filter bar, in display order.
    pub categories: Vec<String>,
    /// Image shown on cards without one.
    pub placeholder_image: String,
    /// chrono format string for the update date.
    pub date_format: String,
    /// Text of the placeholder card shown when nothing matches the filter.
    pub empty_message: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: "Links".to_string(),
            categories: vec!["game".to_string(), "tool".to_string(), "art".to_string()],
            placeholder_image: "https://via.placeholder.com/400x180?text=No+Image".to_string(),
            date_format: "%Y/%m/%d".to_string(),
            empty_message: "No entries yet".to_string(),
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Category labels, dates, the empty placeholder.
    pub text_muted: String,
    pub border: String,
    /// Active filter and admin affordances.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            accent: "#ff7a59".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0f0f14".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#2a2a33".to_string(),
            accent: "#ffb86c".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Admin secret settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminConfig {
    /// Lowercase or uppercase hex SHA-256 of the admin secret. Empty disables login.
    pub password_sha256: String,
}

/// Endpoint service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    /// Where the link list and published blobs are stored.
    pub data_dir: String,
    /// Base of the public blob URLs returned by the upload endpoint.
    /// Empty means `http://<bound address>`.
    pub public_url: String,
    /// Request-size ceiling for the JSON endpoints.
    pub max_upload_bytes: usize,
    /// Entries stored on first `GET` when the list is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            data_dir: "data".to_string(),
            public_url: String::new(),
            max_upload_bytes: 4_500_000,
            seed_file: None,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load an explicit config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Load `config.toml` from `dir` if present, else the stock defaults.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# link-gallery configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Remote endpoints
# ---------------------------------------------------------------------------
[client]
# Link store: GET returns {"links": [...]}, POST replaces the whole list.
links_endpoint = "http://127.0.0.1:8080/api/links"
# Blob publish: POST {"filename", "data"} returns {"url"}.
blob_endpoint = "http://127.0.0.1:8080/api/upload"
# Seconds before a request counts as failed (and the local fallback kicks in).
timeout_secs = 10

# ---------------------------------------------------------------------------
# Local fallback cache (used only when the link store is unreachable)
# ---------------------------------------------------------------------------
[cache]
dir = ".link-gallery-cache"

# ---------------------------------------------------------------------------
# Thumbnail preparation
# ---------------------------------------------------------------------------
[images]
# Wider images are scaled down to this width; narrower ones are never upscaled.
max_width = 400
# JPEG quality (1 = worst, 100 = best).
quality = 75

# ---------------------------------------------------------------------------
# Gallery
# ---------------------------------------------------------------------------
[gallery]
title = "Links"
# Filter bar entries, in order. Entries may still use other free-text categories.
categories = ["game", "tool", "art"]
placeholder_image = "https://via.placeholder.com/400x180?text=No+Image"
# chrono strftime format for the "updated" date on each card.
date_format = "%Y/%m/%d"
empty_message = "No entries yet"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#111111"
text_muted = "#666666"    # Category labels, dates, placeholder
border = "#e0e0e0"
accent = "#ff7a59"        # Active filter, admin buttons

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#0f0f14"
text = "#eeeeee"
text_muted = "#999999"
border = "#2a2a33"
accent = "#ffb86c"

# ---------------------------------------------------------------------------
# Admin
# ---------------------------------------------------------------------------
[admin]
# Hex SHA-256 of the admin secret. Generate with `link-gallery hash-password`.
# Empty disables admin login.
password_sha256 = ""

# ---------------------------------------------------------------------------
# Endpoint service (`link-gallery serve`)
# ---------------------------------------------------------------------------
[server]
bind = "127.0.0.1:8080"
data_dir = "data"
# Base of the URLs handed out for published blobs.
# Leave empty to use http://<bound address>.
public_url = ""
# Request-size ceiling for uploads and list saves, in bytes.
max_upload_bytes = 4500000
# Entries stored on the first GET when the list is empty.
# seed_file = "fixtures/seed.json"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-accent: {light_accent};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-accent: {dark_accent};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_accent = colors.light.accent,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_accent = colors.dark.accent,
    )
}
