//! Shared test utilities: entry builders and lookup helpers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let links = sample_links();
//! let tool = find_entry(&links, 2);
//! assert_eq!(tool.category, Category::Tool);
//! ```

use chrono::{TimeZone, Utc};

use crate::types::{Category, Collection, LinkEntry};

// =========================================================================
// Builders
// =========================================================================

/// A minimal valid entry with the given id and category.
pub fn entry(id: i64, category: Category) -> LinkEntry {
    LinkEntry {
        id,
        title: format!("Entry {id}"),
        url: format!("https://example.com/{id}"),
        category,
        desc: format!("Description {id}"),
        image: None,
        updated_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
    }
}

/// A small collection, newest first: art, tool, game.
pub fn sample_links() -> Collection {
    vec![
        LinkEntry {
            image: Some("https://images.example.com/art.jpg".to_string()),
            ..entry(3, Category::Art)
        },
        entry(2, Category::Tool),
        entry(1, Category::Game),
    ]
}

// =========================================================================
// Lookups — panics with a clear message on miss
// =========================================================================

/// Find an entry by id. Panics if not found.
pub fn find_entry(links: &[LinkEntry], id: i64) -> &LinkEntry {
    links.iter().find(|l| l.id == id).unwrap_or_else(|| {
        let ids: Vec<i64> = links.iter().map(|l| l.id).collect();
        panic!("entry {id} not found. Available: {ids:?}")
    })
}

/// Ids in collection order.
pub fn ids(links: &[LinkEntry]) -> Vec<i64> {
    links.iter().map(|l| l.id).collect()
}
