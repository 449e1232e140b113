//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entry is shown by its identity first (position, title, category),
//! with the details on indented context lines:
//!
//! ```text
//! Links (3, filter: all)
//! 001 Duck Race Game [game]
//!     Id: 1714557600000
//!     URL: ../duck-race/index.html
//!     Image: https://images.example.com/duck.jpg
//!     Updated: 2024/05/01
//!     Description: A browser race game for parties
//! 002 Notes [tool]
//!     Id: 1714557500000
//!     URL: #
//!     Image: inline JPEG (12 KB)
//! ```
//!
//! Mutations print one status line, e.g.
//! `Created 1714557600000 (saved to endpoint)` or
//! `Deleted 1714557600000 (endpoint unreachable, saved locally)`.
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>` or `String`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::client::SaveOutcome;
use crate::data_uri;
use crate::render::{RenderOptions, format_date};
use crate::types::{Filter, LinkEntry};

const DESC_MAX_CHARS: usize = 60;

// ============================================================================
// Helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{head}...")
    }
}

/// Describe an image value without dumping a data URI to the terminal.
fn describe_image(image: &str) -> String {
    if !data_uri::is_data_uri(image) {
        return image.to_string();
    }
    match data_uri::decode(image) {
        Ok(decoded) => {
            let kind = decoded
                .mime
                .strip_prefix("image/")
                .unwrap_or(&decoded.mime)
                .to_ascii_uppercase();
            format!("inline {} ({} KB)", kind, decoded.bytes.len().div_ceil(1024))
        }
        Err(e) => format!("inline (unreadable: {e})"),
    }
}

// ============================================================================
// Collection listing
// ============================================================================

/// Format the entries matching `filter`, in collection order.
pub fn format_links(links: &[LinkEntry], filter: &Filter, options: &RenderOptions) -> Vec<String> {
    let shown: Vec<&LinkEntry> = links.iter().filter(|l| filter.matches(l)).collect();
    let mut lines = vec![format!("Links ({}, filter: {})", shown.len(), filter.as_str())];

    if shown.is_empty() {
        lines.push(format!("{}{}", indent(1), options.empty_message));
        return lines;
    }

    for (pos, link) in shown.iter().enumerate() {
        lines.push(format!(
            "{} {} [{}]",
            format_index(pos + 1),
            link.title,
            link.category
        ));
        lines.push(format!("{}Id: {}", indent(1), link.id));
        lines.push(format!("{}URL: {}", indent(1), link.url));
        if let Some(image) = link.image_ref() {
            lines.push(format!("{}Image: {}", indent(1), describe_image(image)));
        }
        if let Some(updated) = link
            .updated_at
            .and_then(|t| format_date(&t, &options.date_format))
        {
            lines.push(format!("{}Updated: {}", indent(1), updated));
        }
        if !link.desc.is_empty() {
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_desc(&link.desc, DESC_MAX_CHARS)
            ));
        }
    }
    lines
}

pub fn print_links(links: &[LinkEntry], filter: &Filter, options: &RenderOptions) {
    for line in format_links(links, filter, options) {
        println!("{}", line);
    }
}

// ============================================================================
// Mutation status
// ============================================================================

fn describe_outcome(outcome: SaveOutcome) -> &'static str {
    match outcome {
        SaveOutcome::Remote => "saved to endpoint",
        SaveOutcome::SavedLocally => "endpoint unreachable, saved locally",
    }
}

/// One status line for a finished mutation, e.g. `Created 42 (saved to endpoint)`.
pub fn format_mutation(verb: &str, id: i64, outcome: SaveOutcome) -> String {
    format!("{} {} ({})", verb, id, describe_outcome(outcome))
}

pub fn print_mutation(verb: &str, id: i64, outcome: SaveOutcome) {
    println!("{}", format_mutation(verb, id, outcome));
}

// ============================================================================
// Tests
// ============================================================================
