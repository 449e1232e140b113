//! Gallery view-model rendering.
//!
//! A pure mapping from `(collection, filter, is_admin)` to an ordered list of
//! card view-models. Nothing here knows about HTML; [`crate::html`] binds the
//! view-models to markup and the CLI prints them as JSON.
//!
//! Rules:
//! - Cards keep collection order and include only entries matching the filter.
//! - An entry without an image gets the placeholder image.
//! - The update date is formatted with the configured chrono format, or omitted.
//! - Edit and delete actions exist only for the admin.
//! - An empty result is a single placeholder card, never an empty list.
//! - A card that fails to build is logged and skipped; the rest still render.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use thiserror::Error;

use crate::config::GalleryConfig;
use crate::data_uri::{self, DataUriError};
use crate::types::{Filter, LinkEntry};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("entry {id}: malformed inline image: {source}")]
    InvalidImage { id: i64, source: DataUriError },
}

/// Presentation settings that don't depend on the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub placeholder_image: String,
    pub date_format: String,
    pub empty_message: String,
}

impl RenderOptions {
    pub fn from_config(gallery: &GalleryConfig) -> Self {
        Self {
            placeholder_image: gallery.placeholder_image.clone(),
            date_format: gallery.date_format.clone(),
            empty_message: gallery.empty_message.clone(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&GalleryConfig::default())
    }
}

/// Admin affordances attached to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardActions {
    pub edit_id: i64,
    pub delete_id: i64,
}

/// One link card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCard {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Entry image, or the placeholder image.
    pub image_src: String,
    pub has_image: bool,
    /// Formatted update date, absent when the entry has none.
    pub updated: Option<String>,
    /// Where clicking the card (outside the actions) goes.
    pub href: String,
    pub opens_in_new_tab: bool,
    pub actions: Option<CardActions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardView {
    Link(LinkCard),
    Placeholder { message: String },
}

/// The whole rendered gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryView {
    pub filter: String,
    pub is_admin: bool,
    pub cards: Vec<CardView>,
}

impl GalleryView {
    /// Link cards only, in order.
    pub fn link_cards(&self) -> impl Iterator<Item = &LinkCard> {
        self.cards.iter().filter_map(|c| match c {
            CardView::Link(card) => Some(card),
            CardView::Placeholder { .. } => None,
        })
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.cards.as_slice(), [CardView::Placeholder { .. }])
    }
}

/// Format a timestamp, or `None` if the format string is invalid.
pub(crate) fn format_date(t: &DateTime<Utc>, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", t.format(format)).ok()?;
    Some(out)
}

/// Build a single card.
pub fn render_card(
    entry: &LinkEntry,
    is_admin: bool,
    options: &RenderOptions,
) -> Result<LinkCard, RenderError> {
    let (image_src, has_image) = match entry.image_ref() {
        Some(image) => {
            if data_uri::is_data_uri(image) {
                data_uri::validate_header(image).map_err(|source| RenderError::InvalidImage {
                    id: entry.id,
                    source,
                })?;
            }
            (image.to_string(), true)
        }
        None => (options.placeholder_image.clone(), false),
    };

    Ok(LinkCard {
        id: entry.id,
        title: entry.title.clone(),
        description: entry.desc.clone(),
        category: entry.category.to_string(),
        image_src,
        has_image,
        updated: entry
            .updated_at
            .and_then(|t| format_date(&t, &options.date_format)),
        href: entry.url.clone(),
        opens_in_new_tab: true,
        actions: is_admin.then_some(CardActions {
            edit_id: entry.id,
            delete_id: entry.id,
        }),
    })
}

/// Render the filtered collection as card view-models.
pub fn render_gallery(
    links: &[LinkEntry],
    filter: &Filter,
    is_admin: bool,
    options: &RenderOptions,
) -> GalleryView {
    let mut cards: Vec<CardView> = links
        .iter()
        .filter(|entry| filter.matches(entry))
        .filter_map(|entry| match render_card(entry, is_admin, options) {
            Ok(card) => Some(CardView::Link(card)),
            Err(e) => {
                tracing::warn!(error = %e, "skipping card");
                None
            }
        })
        .collect();

    if cards.is_empty() {
        cards.push(CardView::Placeholder {
            message: options.empty_message.clone(),
        });
    }

    GalleryView {
        filter: filter.as_str().to_string(),
        is_admin,
        cards,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{entry, ids, sample_links};
    use crate::types::Category;

    fn card_ids(view: &GalleryView) -> Vec<i64> {
        view.link_cards().map(|c| c.id).collect()
    }

    #[test]
    fn filter_tool_from_two_entries() {
        let links = vec![entry(1, Category::Game), entry(2, Category::Tool)];
        let view = render_gallery(
            &links,
            &Filter::Category(Category::Tool),
            false,
            &RenderOptions::default(),
        );
        assert_eq!(card_ids(&view), vec![2]);
        assert_eq!(view.filter, "tool");
    }

    #[test]
    fn filter_all_keeps_order() {
        let links = sample_links();
        let view = render_gallery(&links, &Filter::All, false, &RenderOptions::default());
        assert_eq!(card_ids(&view), ids(&links));
    }

    #[test]
    fn filter_matches_exact_subset_for_every_category() {
        let links = vec![
            entry(6, Category::Art),
            entry(5, Category::Other("music".into())),
            entry(4, Category::Tool),
            entry(3, Category::Game),
            entry(2, Category::Tool),
            entry(1, Category::Art),
        ];
        let categories = [
            Category::Game,
            Category::Tool,
            Category::Art,
            Category::Other("music".into()),
            Category::Other("nothing".into()),
        ];
        for category in categories {
            let expected: Vec<i64> = links
                .iter()
                .filter(|l| l.category == category)
                .map(|l| l.id)
                .collect();
            let view = render_gallery(
                &links,
                &Filter::Category(category.clone()),
                false,
                &RenderOptions::default(),
            );
            assert_eq!(card_ids(&view), expected, "category {category}");
            assert_eq!(view.is_placeholder(), expected.is_empty());
        }
    }

    #[test]
    fn empty_collection_renders_single_placeholder() {
        for filter in [Filter::All, Filter::Category(Category::Game)] {
            let view = render_gallery(&[], &filter, true, &RenderOptions::default());
            assert_eq!(view.cards.len(), 1);
            assert!(view.is_placeholder());
            assert_eq!(view.link_cards().count(), 0);
        }
    }

    #[test]
    fn placeholder_uses_configured_message() {
        let options = RenderOptions {
            empty_message: "まだ投稿がありません".into(),
            ..RenderOptions::default()
        };
        let view = render_gallery(&[], &Filter::All, false, &options);
        assert_eq!(
            view.cards[0],
            CardView::Placeholder {
                message: "まだ投稿がありません".into()
            }
        );
    }

    #[test]
    fn missing_image_uses_placeholder_image() {
        let options = RenderOptions::default();
        let card = render_card(&entry(1, Category::Game), false, &options).unwrap();
        assert_eq!(card.image_src, options.placeholder_image);
        assert!(!card.has_image);
    }

    #[test]
    fn date_formatting_and_absence() {
        let options = RenderOptions::default();
        let card = render_card(&entry(1, Category::Game), false, &options).unwrap();
        assert_eq!(card.updated.as_deref(), Some("2024/05/01"));

        let undated = LinkEntry {
            updated_at: None,
            ..entry(2, Category::Game)
        };
        let card = render_card(&undated, false, &options).unwrap();
        assert_eq!(card.updated, None);
    }

    #[test]
    fn invalid_date_format_omits_date() {
        let options = RenderOptions {
            date_format: "%Q".into(),
            ..RenderOptions::default()
        };
        let card = render_card(&entry(1, Category::Game), false, &options).unwrap();
        assert_eq!(card.updated, None);
    }

    #[test]
    fn admin_actions_only_for_admin() {
        let options = RenderOptions::default();
        let e = entry(7, Category::Art);
        assert_eq!(render_card(&e, false, &options).unwrap().actions, None);
        assert_eq!(
            render_card(&e, true, &options).unwrap().actions,
            Some(CardActions {
                edit_id: 7,
                delete_id: 7
            })
        );
    }

    #[test]
    fn cards_open_url_in_new_tab() {
        let card = render_card(&entry(1, Category::Game), false, &RenderOptions::default()).unwrap();
        assert_eq!(card.href, "https://example.com/1");
        assert!(card.opens_in_new_tab);
    }

    #[test]
    fn malformed_inline_image_skips_only_that_card() {
        let broken = LinkEntry {
            image: Some("data:image/png".into()),
            ..entry(2, Category::Tool)
        };
        let links = vec![entry(3, Category::Tool), broken, entry(1, Category::Tool)];
        let view = render_gallery(&links, &Filter::All, false, &RenderOptions::default());
        assert_eq!(card_ids(&view), vec![3, 1]);
    }

    #[test]
    fn inline_image_is_kept() {
        let inline = LinkEntry {
            image: Some(data_uri::encode("image/jpeg", b"abc")),
            ..entry(1, Category::Art)
        };
        let card = render_card(&inline, false, &RenderOptions::default()).unwrap();
        assert!(card.has_image);
        assert!(card.image_src.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn view_serializes_with_kind_tags() {
        let view = render_gallery(&[], &Filter::All, false, &RenderOptions::default());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["cards"][0]["kind"], "placeholder");
    }
}
