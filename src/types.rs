//! Shared data model: link entries, categories and the render filter.
//!
//! These types travel over the wire between the endpoint service, the HTTP
//! clients and the local cache, so their JSON shape is fixed:
//! `id, title, url, category, desc, image, updatedAt`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One card's data record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEntry {
    /// Milliseconds since the epoch at creation time.
    pub id: i64,
    pub title: String,
    /// Relative, absolute, or a placeholder such as `#`.
    pub url: String,
    #[serde(default = "Category::unset")]
    pub category: Category,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub desc: String,
    /// Remote URL or inline `data:` URI, stored as received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LinkEntry {
    /// The image to show, if any. A blank stored value counts as none.
    pub fn image_ref(&self) -> Option<&str> {
        self.image.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// The full ordered set of link entries, persisted as one unit.
pub type Collection = Vec<LinkEntry>;

/// Wire envelope used by both `GET` and `POST` on the link store endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinksPayload {
    pub links: Collection,
}

/// Card category. The known set is small; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Game,
    Tool,
    Art,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Game => "game",
            Category::Tool => "tool",
            Category::Art => "art",
            Category::Other(s) => s,
        }
    }

    /// Category of an entry stored without one.
    pub fn unset() -> Self {
        Category::Other(String::new())
    }

    /// Map a stored label exactly. Anything but the lowercase known names,
    /// including differently cased ones, is kept byte for byte.
    pub fn from_label(label: String) -> Self {
        match label.as_str() {
            "game" => Category::Game,
            "tool" => Category::Tool,
            "art" => Category::Art,
            _ => Category::Other(label),
        }
    }

    /// Parse a label typed by a user. Known names match case-insensitively.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "game" => Category::Game,
            "tool" => Category::Tool,
            "art" => Category::Art,
            _ => Category::Other(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.map(Category::from_label).unwrap_or_else(Category::unset))
    }
}

/// Which subset of the collection the renderer draws.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Category(Category),
}

impl Filter {
    /// `"all"` (or an empty string) selects everything; anything else is a category.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Filter::All
        } else {
            Filter::Category(Category::parse(trimmed))
        }
    }

    pub fn matches(&self, entry: &LinkEntry) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(c) => entry.category == *c,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Filter::All => "all",
            Filter::Category(c) => c.as_str(),
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}
