//! # Link Gallery
//!
//! A personal link and portfolio gallery: an ordered list of categorized link
//! cards that anyone can browse by category, and that a single admin edits
//! after unlocking with a shared secret.
//!
//! # Architecture
//!
//! ```text
//! load ──► render                       (visitor)
//! login ──► submit ──► prepare image ──► publish ──► mutate ──► save ──► render
//! ```
//!
//! Persistence is deliberately one operation: the whole collection is loaded
//! at once and saved at once. There is no incremental update and no conflict
//! detection; the last writer wins.
//!
//! Every network call has a local fallback. The link store falls back to a
//! JSON cache on disk; the blob store falls back to embedding the image as a
//! data URI. A visitor never sees an error page because an endpoint is down.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `LinkEntry`, `Category`, `Filter`: the wire data model |
//! | [`imaging`] | Decode, downsample to a maximum width, re-encode as JPEG |
//! | [`data_uri`] | `data:` URI encoding and decoding |
//! | [`client`] | HTTP clients for the link store and blob publish endpoints |
//! | [`local_cache`] | Key → JSON file cache behind the link store client |
//! | [`auth`] | Two-state admin session unlocked by a SHA-256 digest |
//! | [`editor`] | In-memory collection, admin mutations, submit pipeline |
//! | [`render`] | Pure `(collection, filter, is_admin)` → card view-models |
//! | [`html`] | Maud page for the view-models |
//! | [`server`] | actix-web service implementing both endpoints on the filesystem |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## View-Models Over Markup
//!
//! [`render`] produces plain data, not HTML. The server binds it to markup
//! through [`html`], the CLI prints it as JSON, and tests assert on fields
//! instead of scraping strings.
//!
//! ## Digest, Not Secret
//!
//! `config.toml` stores only the hex SHA-256 of the admin secret
//! (`link-gallery hash-password` prints it). The session compares digests.
//! This keeps the secret out of the config file; it is not an access-control
//! system, and the endpoints themselves remain open.
//!
//! ## Pure-Rust Imaging
//!
//! Thumbnails are produced with the `image` crate (Lanczos3 resampling, JPEG
//! encoding). No system libraries, so the binary is self-contained.

pub mod auth;
pub mod client;
pub mod config;
pub mod data_uri;
pub mod editor;
pub mod html;
pub mod imaging;
pub mod local_cache;
pub mod output;
pub mod render;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
