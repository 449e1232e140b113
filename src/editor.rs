//! Collection editor: the in-memory collection and the admin mutations on it.
//!
//! [`Editor`] owns the whole [`AppState`]. Mutations are synchronous and touch
//! only memory; persistence is a separate step ([`Editor::persist`]) that
//! snapshots the collection and saves it on a spawned task, so callers can
//! redraw immediately and await the outcome only if they care.
//!
//! The form pipeline ([`Editor::submit`]) ties it together:
//!
//! ```text
//! gate → validate → prepare image → publish (or inline) → create/update → spawn save
//! ```
//!
//! The [`SubmitGate`] stays closed from the start of a submit until its save
//! has finished, so a second submit in the meantime fails with
//! [`EditorError::Busy`] instead of racing the first.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::auth::{AuthError, Session};
use crate::client::{BlobPublisher, ImageValue, LinkStore, SaveOutcome};
use crate::config::AppConfig;
use crate::imaging::{
    BackendError, PrepareParams, RustBackend, declared_mime, is_image_mime, prepare_image,
};
use crate::render::{GalleryView, RenderOptions, render_gallery};
use crate::types::{Category, Collection, Filter, LinkEntry};

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("{0}")]
    Validation(String),
    #[error("no entry with id {0}")]
    NotFound(i64),
    #[error("another submit is still in progress")]
    Busy,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("image preparation failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Everything the page shows, in one place.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub links: Collection,
    pub is_admin: bool,
    pub current_filter: Filter,
    /// Id of the entry the form is editing; `None` means the form creates.
    pub editing_id: Option<i64>,
}

/// Form fields for creating or updating an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDraft {
    pub title: String,
    pub url: String,
    pub category: Category,
    pub desc: String,
    /// Image URL or data URI typed into the form. Blank means none.
    pub image: Option<String>,
}

impl LinkDraft {
    /// Prefill a draft from an existing entry.
    pub fn from_entry(entry: &LinkEntry) -> Self {
        Self {
            title: entry.title.clone(),
            url: entry.url.clone(),
            category: entry.category.clone(),
            desc: entry.desc.clone(),
            image: entry.image.clone(),
        }
    }

    /// Trim every field and check the required ones.
    fn normalized(self) -> Result<Self, EditorError> {
        let title = self.title.trim().to_string();
        let url = self.url.trim().to_string();
        if title.is_empty() || url.is_empty() {
            return Err(EditorError::Validation("title and url are required".into()));
        }
        Ok(Self {
            title,
            url,
            category: self.category,
            desc: self.desc.trim().to_string(),
            image: self
                .image
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }
}

/// Raw bytes picked as the entry's thumbnail.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    /// Declared MIME type. Only `image/*` uploads are processed.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read a file, declaring its MIME type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self {
            filename,
            mime: declared_mime(path)
                .unwrap_or("application/octet-stream")
                .to_string(),
            bytes,
        })
    }

    /// Name suggested to the blob store. Prepared thumbnails are always JPEG.
    fn thumbnail_filename(&self) -> String {
        let stem = Path::new(&self.filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "thumbnail".to_string());
        format!("{stem}.jpg")
    }
}

/// One form submission.
#[derive(Debug, Clone, Default)]
pub struct SubmitForm {
    pub draft: LinkDraft,
    pub upload: Option<ImageUpload>,
}

/// Explicit answer to "delete this entry?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// Single-flight guard for the submit pipeline.
#[derive(Debug, Clone, Default)]
pub struct SubmitGate {
    busy: Arc<AtomicBool>,
}

impl SubmitGate {
    pub fn try_acquire(&self) -> Option<SubmitPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Reopens the gate when dropped.
#[derive(Debug)]
pub struct SubmitPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmitPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Handle to a spawned save.
#[derive(Debug)]
pub struct PendingSave {
    handle: JoinHandle<SaveOutcome>,
}

impl PendingSave {
    pub async fn wait(self) -> Result<SaveOutcome, EditorError> {
        Ok(self.handle.await?)
    }
}

/// Result of a successful submit: the entry touched and its pending save.
#[derive(Debug)]
pub struct Submitted {
    pub id: i64,
    pub save: PendingSave,
}

impl Submitted {
    pub async fn wait(self) -> Result<SaveOutcome, EditorError> {
        self.save.wait().await
    }
}

/// Next id: the current time in milliseconds, bumped past every existing id.
pub fn next_id(links: &[LinkEntry], now_millis: i64) -> i64 {
    let max_existing = links.iter().map(|l| l.id).max().unwrap_or(i64::MIN);
    now_millis.max(max_existing.saturating_add(1))
}

/// Settings the editor takes from [`AppConfig`].
#[derive(Debug, Clone, Default)]
pub struct EditorSettings {
    pub prepare: PrepareParams,
    pub render: RenderOptions,
}

impl EditorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            prepare: config.images.prepare_params(),
            render: RenderOptions::from_config(&config.gallery),
        }
    }
}

pub struct Editor {
    state: AppState,
    session: Session,
    store: Arc<dyn LinkStore>,
    publisher: Option<BlobPublisher>,
    gate: SubmitGate,
    settings: EditorSettings,
}

impl Editor {
    /// An editor with an empty collection. Call [`Editor::load`] to fill it.
    ///
    /// Without a publisher, uploaded images are always embedded inline.
    pub fn new(
        store: Arc<dyn LinkStore>,
        publisher: Option<BlobPublisher>,
        session: Session,
        settings: EditorSettings,
    ) -> Self {
        Self {
            state: AppState::default(),
            session,
            store,
            publisher,
            gate: SubmitGate::default(),
            settings,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn links(&self) -> &[LinkEntry] {
        &self.state.links
    }

    pub fn gate(&self) -> &SubmitGate {
        &self.gate
    }

    /// Replace the in-memory collection with whatever the store has.
    pub async fn load(&mut self) -> usize {
        self.state.links = self.store.load().await;
        tracing::debug!(count = self.state.links.len(), "collection loaded");
        self.state.links.len()
    }

    pub fn login(&mut self, secret: &str) -> Result<(), EditorError> {
        self.session.login(secret)?;
        self.state.is_admin = true;
        Ok(())
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.state.current_filter = filter;
    }

    /// Render the current state.
    pub fn view(&self) -> GalleryView {
        render_gallery(
            &self.state.links,
            &self.state.current_filter,
            self.session.is_admin(),
            &self.settings.render,
        )
    }

    /// Insert a new entry at the front. Returns its id.
    pub fn create(&mut self, draft: LinkDraft) -> Result<i64, EditorError> {
        self.session.require_admin()?;
        let draft = draft.normalized()?;
        let now = Utc::now();
        let id = next_id(&self.state.links, now.timestamp_millis());
        self.state.links.insert(
            0,
            LinkEntry {
                id,
                title: draft.title,
                url: draft.url,
                category: draft.category,
                desc: draft.desc,
                image: draft.image,
                updated_at: Some(now),
            },
        );
        tracing::info!(id, "entry created");
        Ok(id)
    }

    /// Replace an entry's fields in place, keeping its id and position.
    pub fn update(&mut self, id: i64, draft: LinkDraft) -> Result<(), EditorError> {
        self.session.require_admin()?;
        let draft = draft.normalized()?;
        let entry = self
            .state
            .links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(EditorError::NotFound(id))?;
        entry.title = draft.title;
        entry.url = draft.url;
        entry.category = draft.category;
        entry.desc = draft.desc;
        entry.image = draft.image;
        entry.updated_at = Some(Utc::now());
        tracing::info!(id, "entry updated");
        Ok(())
    }

    /// Remove an entry. Returns whether anything was removed; a missing id or a
    /// declined confirmation leaves the collection as it was.
    pub fn delete(&mut self, id: i64, confirmation: Confirmation) -> Result<bool, EditorError> {
        self.session.require_admin()?;
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }
        let before = self.state.links.len();
        self.state.links.retain(|l| l.id != id);
        let removed = self.state.links.len() != before;
        if removed {
            if self.state.editing_id == Some(id) {
                self.state.editing_id = None;
            }
            tracing::info!(id, "entry deleted");
        }
        Ok(removed)
    }

    /// Point the form at an existing entry and return its prefilled draft.
    pub fn begin_edit(&mut self, id: i64) -> Result<LinkDraft, EditorError> {
        self.session.require_admin()?;
        let entry = self
            .state
            .links
            .iter()
            .find(|l| l.id == id)
            .ok_or(EditorError::NotFound(id))?;
        self.state.editing_id = Some(id);
        Ok(LinkDraft::from_entry(entry))
    }

    pub fn cancel_edit(&mut self) {
        self.state.editing_id = None;
    }

    /// Save a snapshot of the collection on a spawned task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn persist(&self) -> PendingSave {
        self.spawn_save(None)
    }

    fn spawn_save(&self, permit: Option<SubmitPermit>) -> PendingSave {
        let store = Arc::clone(&self.store);
        let snapshot = self.state.links.clone();
        let handle = tokio::spawn(async move {
            let outcome = store.save(&snapshot).await;
            drop(permit);
            outcome
        });
        PendingSave { handle }
    }

    /// Run the whole form pipeline: optional image, create or update, save.
    ///
    /// The in-memory collection is already updated when this returns.
    pub async fn submit(&mut self, form: SubmitForm) -> Result<Submitted, EditorError> {
        self.session.require_admin()?;
        let permit = self.gate.try_acquire().ok_or(EditorError::Busy)?;

        let mut draft = form.draft.normalized()?;
        if let Some(upload) = form.upload {
            if let Some(image) = self.upload_image(upload).await? {
                draft.image = Some(image.into_string());
            }
        }

        let id = match self.state.editing_id {
            Some(id) => {
                self.update(id, draft)?;
                id
            }
            None => self.create(draft)?,
        };
        self.state.editing_id = None;

        Ok(Submitted {
            id,
            save: self.spawn_save(Some(permit)),
        })
    }

    async fn upload_image(&self, upload: ImageUpload) -> Result<Option<ImageValue>, EditorError> {
        if !is_image_mime(&upload.mime) {
            tracing::debug!(filename = %upload.filename, mime = %upload.mime, "ignoring non-image upload");
            return Ok(None);
        }
        let filename = upload.thumbnail_filename();
        let params = self.settings.prepare;
        // Decode and resample off the async workers.
        let prepared = tokio::task::spawn_blocking(move || {
            prepare_image(&RustBackend::new(), &upload.bytes, &params)
        })
        .await??;
        tracing::debug!(
            width = prepared.width,
            height = prepared.height,
            "thumbnail prepared"
        );
        let value = match &self.publisher {
            Some(publisher) => {
                publisher
                    .publish_or_inline(&prepared.data_uri, &filename)
                    .await
            }
            None => ImageValue::Inline(prepared.data_uri),
        };
        tracing::debug!(published = value.is_published(), "thumbnail attached");
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_secret;
    use crate::client::links::tests::MemoryLinkStore;
    use crate::client::tests::unreachable_config;
    use crate::imaging::rust_backend::tests::synthetic_png;
    use crate::test_helpers::{entry, find_entry, ids, sample_links};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    const SECRET: &str = "letmein";

    fn admin_editor(store: Arc<dyn LinkStore>) -> Editor {
        let mut editor = Editor::new(
            store,
            None,
            Session::new(&hash_secret(SECRET)),
            EditorSettings::default(),
        );
        editor.login(SECRET).unwrap();
        editor
    }

    async fn loaded_admin(links: Collection) -> (Editor, Arc<MemoryLinkStore>) {
        let store = Arc::new(MemoryLinkStore::with_links(links));
        let mut editor = admin_editor(store.clone());
        editor.load().await;
        (editor, store)
    }

    fn draft(title: &str, url: &str) -> LinkDraft {
        LinkDraft {
            title: title.into(),
            url: url.into(),
            category: Category::Tool,
            desc: "  some text  ".into(),
            image: None,
        }
    }

    // =========================================================================
    // next_id
    // =========================================================================

    #[test]
    fn next_id_uses_clock_when_ahead() {
        assert_eq!(next_id(&sample_links(), 1_000), 1_000);
        assert_eq!(next_id(&[], 42), 42);
    }

    #[test]
    fn next_id_bumps_past_existing() {
        let links = vec![entry(5_000, Category::Game)];
        assert_eq!(next_id(&links, 5_000), 5_001);
        assert_eq!(next_id(&links, 10), 5_001);
    }

    // =========================================================================
    // create / update / delete
    // =========================================================================

    #[tokio::test]
    async fn create_inserts_at_front_with_fresh_id() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        let before = editor.links().len();
        let called_at = Utc::now();

        let id = editor.create(draft("  New  ", " https://new.example ")).unwrap();

        assert_eq!(editor.links().len(), before + 1);
        let first = &editor.links()[0];
        assert_eq!(first.id, id);
        assert_eq!(first.title, "New");
        assert_eq!(first.url, "https://new.example");
        assert_eq!(first.desc, "some text");
        assert!(first.updated_at.unwrap() >= called_at);
        assert!(sample_links().iter().all(|l| l.id != id));
        assert_eq!(&editor.links()[1..], sample_links().as_slice());
    }

    #[tokio::test]
    async fn back_to_back_creates_get_distinct_ids() {
        let (mut editor, _) = loaded_admin(Vec::new()).await;
        let a = editor.create(draft("a", "#")).unwrap();
        let b = editor.create(draft("b", "#")).unwrap();
        assert_ne!(a, b);
        assert_eq!(ids(editor.links()), vec![b, a]);
    }

    #[tokio::test]
    async fn create_rejects_blank_required_fields() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        for (title, url) in [("", "https://x"), ("t", "   "), (" ", "")] {
            let err = editor.create(draft(title, url)).unwrap_err();
            assert!(matches!(err, EditorError::Validation(_)));
        }
        assert_eq!(editor.links(), sample_links().as_slice());
    }

    #[tokio::test]
    async fn update_keeps_position_and_id() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        editor
            .update(
                2,
                LinkDraft {
                    category: Category::Art,
                    ..draft("Renamed", "https://renamed.example")
                },
            )
            .unwrap();

        assert_eq!(ids(editor.links()), ids(&sample_links()));
        for (after, original) in editor.links().iter().zip(sample_links()) {
            if original.id != 2 {
                assert_eq!(*after, original);
            }
        }
        let updated = find_entry(editor.links(), 2);
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.category, Category::Art);
        assert!(updated.updated_at > find_entry(&sample_links(), 2).updated_at);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        let err = editor.update(999, draft("t", "u")).unwrap_err();
        assert!(matches!(err, EditorError::NotFound(999)));
        assert_eq!(editor.links(), sample_links().as_slice());
    }

    #[tokio::test]
    async fn update_validation_leaves_entry_untouched() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        assert!(editor.update(2, draft("", "u")).is_err());
        assert_eq!(editor.links(), sample_links().as_slice());
    }

    #[tokio::test]
    async fn delete_removes_only_that_id() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        assert!(editor.delete(2, Confirmation::Confirmed).unwrap());
        assert_eq!(ids(editor.links()), vec![3, 1]);
    }

    #[tokio::test]
    async fn delete_missing_or_declined_is_noop() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        assert!(!editor.delete(999, Confirmation::Confirmed).unwrap());
        assert!(!editor.delete(2, Confirmation::Declined).unwrap());
        assert_eq!(editor.links(), sample_links().as_slice());
    }

    #[tokio::test]
    async fn mutations_require_admin() {
        let store = Arc::new(MemoryLinkStore::with_links(sample_links()));
        let mut editor = Editor::new(
            store,
            None,
            Session::new(&hash_secret(SECRET)),
            EditorSettings::default(),
        );
        editor.load().await;

        assert!(matches!(
            editor.create(draft("t", "u")),
            Err(EditorError::Auth(AuthError::NotAdmin))
        ));
        assert!(matches!(
            editor.delete(1, Confirmation::Confirmed),
            Err(EditorError::Auth(AuthError::NotAdmin))
        ));
        assert!(matches!(
            editor.login("nope"),
            Err(EditorError::Auth(AuthError::WrongSecret))
        ));
        assert!(!editor.state().is_admin);
        assert_eq!(editor.links(), sample_links().as_slice());
    }

    // =========================================================================
    // load / view / filter
    // =========================================================================

    #[tokio::test]
    async fn reload_is_idempotent() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        let first = editor.links().to_vec();
        editor.load().await;
        assert_eq!(editor.links(), first.as_slice());
    }

    #[tokio::test]
    async fn view_follows_filter_and_admin_flag() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        editor.set_filter(Filter::Category(Category::Tool));
        let view = editor.view();
        let cards: Vec<_> = view.link_cards().collect();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, 2);
        assert!(cards[0].actions.is_some());
        assert_eq!(editor.state().current_filter, Filter::Category(Category::Tool));
    }

    // =========================================================================
    // edit flow and submit
    // =========================================================================

    #[tokio::test]
    async fn begin_edit_prefills_and_submit_updates() {
        let (mut editor, store) = loaded_admin(sample_links()).await;
        let mut form_draft = editor.begin_edit(3).unwrap();
        assert_eq!(form_draft.image.as_deref(), Some("https://images.example.com/art.jpg"));
        assert_eq!(editor.state().editing_id, Some(3));

        form_draft.title = "Edited".into();
        let pending = editor
            .submit(SubmitForm {
                draft: form_draft,
                upload: None,
            })
            .await
            .unwrap();
        assert_eq!(pending.wait().await.unwrap(), SaveOutcome::Remote);

        assert_eq!(editor.state().editing_id, None);
        assert_eq!(ids(editor.links()), ids(&sample_links()));
        assert_eq!(find_entry(editor.links(), 3).title, "Edited");
        assert_eq!(store.saved().last().unwrap(), &editor.links().to_vec());
    }

    #[tokio::test]
    async fn cancel_edit_makes_submit_create() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        editor.begin_edit(2).unwrap();
        editor.cancel_edit();
        let pending = editor
            .submit(SubmitForm {
                draft: draft("Fresh", "#"),
                upload: None,
            })
            .await
            .unwrap();
        pending.wait().await.unwrap();
        assert_eq!(editor.links().len(), sample_links().len() + 1);
        assert_eq!(editor.links()[0].title, "Fresh");
    }

    #[tokio::test]
    async fn begin_edit_missing_id_is_not_found() {
        let (mut editor, _) = loaded_admin(sample_links()).await;
        assert!(matches!(editor.begin_edit(42), Err(EditorError::NotFound(42))));
        assert_eq!(editor.state().editing_id, None);
    }

    #[tokio::test]
    async fn submit_with_upload_embeds_thumbnail_when_publish_fails() {
        let store = Arc::new(MemoryLinkStore::default());
        let publisher = BlobPublisher::new(&unreachable_config()).unwrap();
        let mut editor = Editor::new(
            store,
            Some(publisher),
            Session::new(&hash_secret(SECRET)),
            EditorSettings::default(),
        );
        editor.login(SECRET).unwrap();

        let pending = editor
            .submit(SubmitForm {
                draft: draft("With image", "#"),
                upload: Some(ImageUpload {
                    filename: "photo.png".into(),
                    mime: "image/png".into(),
                    bytes: synthetic_png(1600, 900),
                }),
            })
            .await
            .unwrap();
        pending.wait().await.unwrap();

        let image = editor.links()[0].image.as_deref().unwrap();
        assert!(image.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn other_tasks_run_while_thumbnail_is_prepared() {
        use std::sync::atomic::AtomicUsize;
        use std::time::Duration;

        let (mut editor, _) = loaded_admin(Vec::new()).await;
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = Arc::clone(&ticks);
            async move {
                let mut interval = tokio::time::interval(Duration::from_millis(1));
                loop {
                    interval.tick().await;
                    ticks.fetch_add(1, Ordering::Relaxed);
                }
            }
        });

        let pending = editor
            .submit(SubmitForm {
                draft: draft("Large image", "#"),
                upload: Some(ImageUpload {
                    filename: "large.png".into(),
                    mime: "image/png".into(),
                    bytes: synthetic_png(2000, 1500),
                }),
            })
            .await
            .unwrap();
        // Single-threaded runtime: the ticker only ran if submit yielded
        // while the image was being decoded and resampled.
        assert!(ticks.load(Ordering::Relaxed) > 0);
        ticker.abort();
        pending.wait().await.unwrap();
        assert!(editor.links()[0].image.is_some());
    }

    #[tokio::test]
    async fn submit_ignores_non_image_upload() {
        let (mut editor, _) = loaded_admin(Vec::new()).await;
        let pending = editor
            .submit(SubmitForm {
                draft: LinkDraft {
                    image: Some("https://img.example/a.png".into()),
                    ..draft("t", "#")
                },
                upload: Some(ImageUpload {
                    filename: "notes.txt".into(),
                    mime: "text/plain".into(),
                    bytes: b"hello".to_vec(),
                }),
            })
            .await
            .unwrap();
        pending.wait().await.unwrap();
        assert_eq!(editor.links()[0].image.as_deref(), Some("https://img.example/a.png"));
    }

    #[tokio::test]
    async fn submit_with_broken_image_changes_nothing() {
        let (mut editor, store) = loaded_admin(sample_links()).await;
        let err = editor
            .submit(SubmitForm {
                draft: draft("t", "#"),
                upload: Some(ImageUpload {
                    filename: "broken.jpg".into(),
                    mime: "image/jpeg".into(),
                    bytes: b"not an image".to_vec(),
                }),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Imaging(_)));
        assert_eq!(editor.links(), sample_links().as_slice());
        assert!(store.saved().is_empty());
        assert!(!editor.gate().is_busy());
    }

    #[tokio::test]
    async fn submit_offline_still_updates_memory() {
        let store = Arc::new(MemoryLinkStore::offline());
        let mut editor = admin_editor(store);
        let pending = editor
            .submit(SubmitForm {
                draft: draft("Offline", "#"),
                upload: None,
            })
            .await
            .unwrap();
        assert_eq!(editor.links()[0].title, "Offline");
        assert_eq!(pending.wait().await.unwrap(), SaveOutcome::SavedLocally);
    }

    // =========================================================================
    // Submit gate
    // =========================================================================

    /// Store whose saves block until released.
    #[derive(Default)]
    struct HeldStore {
        release: Notify,
    }

    #[async_trait]
    impl LinkStore for HeldStore {
        async fn load(&self) -> Collection {
            Vec::new()
        }

        async fn save(&self, _links: &Collection) -> SaveOutcome {
            self.release.notified().await;
            SaveOutcome::Remote
        }
    }

    #[test]
    fn gate_is_single_flight() {
        let gate = SubmitGate::default();
        let permit = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test]
    async fn second_submit_is_busy_until_save_completes() {
        let store = Arc::new(HeldStore::default());
        let mut editor = admin_editor(store.clone());

        let pending = editor
            .submit(SubmitForm {
                draft: draft("first", "#"),
                upload: None,
            })
            .await
            .unwrap();

        let err = editor
            .submit(SubmitForm {
                draft: draft("second", "#"),
                upload: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Busy));
        assert_eq!(editor.links().len(), 1);

        store.release.notify_one();
        pending.wait().await.unwrap();

        assert!(!editor.gate().is_busy());
        let pending = editor
            .submit(SubmitForm {
                draft: draft("third", "#"),
                upload: None,
            })
            .await
            .unwrap();
        store.release.notify_one();
        pending.wait().await.unwrap();
        assert_eq!(editor.links().len(), 2);
    }

    #[tokio::test]
    async fn validation_failure_reopens_gate() {
        let (mut editor, _) = loaded_admin(Vec::new()).await;
        let err = editor
            .submit(SubmitForm {
                draft: draft("", "#"),
                upload: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::Validation(_)));
        assert!(!editor.gate().is_busy());
    }

    #[test]
    fn thumbnail_filename_is_jpeg() {
        let upload = ImageUpload {
            filename: "holiday.photo.png".into(),
            mime: "image/png".into(),
            bytes: Vec::new(),
        };
        assert_eq!(upload.thumbnail_filename(), "holiday.photo.jpg");
    }
}
