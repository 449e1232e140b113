//! HTML binding for the gallery view.
//!
//! Turns a [`GalleryView`] into a complete page: a filter bar, the card grid
//! and, when nothing matches, the placeholder card. The view decides *what*
//! is shown; this module only decides the markup.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating,
//! which escapes every interpolated value.
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time and prefixed with the color
//! custom properties generated from `[colors]` in the config.

use maud::{DOCTYPE, Markup, html};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::config::{self, AppConfig};
use crate::render::{CardView, GalleryView, LinkCard};

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Page-level settings that don't change between requests.
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub title: String,
    /// Filter bar entries, in display order. "all" is always first.
    pub categories: Vec<String>,
    pub css: String,
}

impl PageSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        Self {
            title: config.gallery.title.clone(),
            categories: config.gallery.categories.clone(),
            css: format!("{}\n\n{}", color_css, CSS_STATIC),
        }
    }
}

/// Render the full gallery page.
pub fn render_page(view: &GalleryView, page: &PageSettings) -> Markup {
    let content = html! {
        header.site-header {
            h1 { (page.title) }
            (render_filter_bar(&page.categories, &view.filter))
        }
        main.gallery {
            div.card-grid {
                @for card in &view.cards {
                    (render_card_view(card))
                }
            }
        }
    };
    base_document(&page.title, &page.css, view.is_admin.then_some("admin"), content)
}

fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Category buttons. The current filter gets the `active` class.
pub fn render_filter_bar(categories: &[String], current: &str) -> Markup {
    html! {
        nav.filter-bar {
            a.filter-btn.active[current == "all"] href="?category=all" { "all" }
            @for category in categories {
                a.filter-btn.active[current == category.as_str()]
                    href=(filter_href(category)) { (category) }
            }
        }
    }
}

/// Query link selecting one category. Free-text labels may hold `&`, `#` or `+`.
fn filter_href(category: &str) -> String {
    format!("?category={}", utf8_percent_encode(category, NON_ALPHANUMERIC))
}

fn render_card_view(card: &CardView) -> Markup {
    match card {
        CardView::Link(card) => render_link_card(card),
        CardView::Placeholder { message } => html! {
            div.card.placeholder-card { p { (message) } }
        },
    }
}

fn render_link_card(card: &LinkCard) -> Markup {
    html! {
        article.card data-id=(card.id) data-category=(card.category) {
            a.card-link href=(card.href)
                target=[card.opens_in_new_tab.then_some("_blank")]
                rel=[card.opens_in_new_tab.then_some("noopener")] {
                img.card-image.no-image[!card.has_image]
                    src=(card.image_src) alt=(card.title) loading="lazy";
                div.card-body {
                    span.card-category { (card.category) }
                    h3.card-title { (card.title) }
                    @if !card.description.is_empty() {
                        p.card-desc { (card.description) }
                    }
                    @if let Some(updated) = &card.updated {
                        time.card-date { (updated) }
                    }
                }
            }
            @if let Some(actions) = &card.actions {
                div.card-actions {
                    button.edit-btn type="button" data-action="edit" data-id=(actions.edit_id) { "Edit" }
                    button.delete-btn type="button" data-action="delete" data-id=(actions.delete_id) { "Delete" }
                }
            }
        }
    }
}
