//! Editor session lifecycle: open or create a document, keep its page
//! background current, and persist annotations by autosave and manual save.

use crate::canvas::Canvas;
use crate::config::EditorConfig;
use crate::pages::{RenderTicket, RenderTracker, render_ticketed};
use crate::pdf::{PageImage, PdfBackend, PdfHandle, RenderError};
use crate::shapes::Shape;
use crate::storage::{
    AutoSaver, DocumentStatus, DocumentStore, FileUploader, SaveJob, SaveOutcome, StorageError, StoredDocument,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Document store failed: {0}")]
    Store(#[source] StorageError),
    #[error("Document {0} has no source PDF")]
    MissingPdf(String),
    #[error("Source PDF unavailable: {0}")]
    Transfer(#[source] StorageError),
    #[error("Source PDF could not be opened: {0}")]
    Pdf(#[source] RenderError),
}

/// Persistence state of the live scene, for the save indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Unsaved,
    Saving,
}

/// Outcome of opening a document. A load failure is terminal.
pub enum SessionState {
    Ready(Box<EditorSession>),
    FileMissing { reason: String },
}

impl SessionState {
    pub fn from_open(result: Result<EditorSession, LoadError>) -> Self {
        match result {
            Ok(session) => SessionState::Ready(Box::new(session)),
            Err(e) => {
                log::error!("Failed to open document: {}", e);
                SessionState::FileMissing {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_file_missing(&self) -> bool {
        matches!(self, SessionState::FileMissing { .. })
    }
}

pub struct EditorSession {
    pub canvas: Canvas,
    document: StoredDocument,
    handle: PdfHandle,
    backend: Arc<dyn PdfBackend>,
    store: Arc<dyn DocumentStore>,
    autosaver: AutoSaver,
    renders: RenderTracker,
    background: Option<PageImage>,
    save_status: SaveStatus,
    /// Scene as of the last change check, to detect edits for autosave.
    observed: Vec<Shape>,
}

impl EditorSession {
    /// Load a stored document and its source PDF.
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        uploader: &dyn FileUploader,
        backend: Arc<dyn PdfBackend>,
        id: &str,
        config: EditorConfig,
    ) -> Result<Self, LoadError> {
        let document = store.load(id).await.map_err(LoadError::Store)?;
        let url = document
            .pdf_url
            .clone()
            .ok_or_else(|| LoadError::MissingPdf(document.id.clone()))?;
        let bytes = uploader.fetch(&url).await.map_err(LoadError::Transfer)?;
        let handle = backend.load_document(&bytes).await.map_err(LoadError::Pdf)?;
        log::info!(
            "Opened {} ({} annotations, {} pages)",
            document.id,
            document.annotations.len(),
            handle.page_count()
        );
        Ok(Self::assemble(store, backend, document, handle, config))
    }

    /// Upload a new PDF and create a draft document for it.
    pub async fn create(
        store: Arc<dyn DocumentStore>,
        uploader: &dyn FileUploader,
        backend: Arc<dyn PdfBackend>,
        name: &str,
        file_name: &str,
        pdf: &[u8],
        config: EditorConfig,
    ) -> Result<Self, LoadError> {
        let handle = backend.load_document(pdf).await.map_err(LoadError::Pdf)?;
        let url = uploader.upload(file_name, pdf).await.map_err(LoadError::Transfer)?;

        let mut document = StoredDocument::new(Uuid::new_v4().to_string(), name);
        document.pdf_url = Some(url);
        document.total_pages = backend.page_count(&handle).max(1);
        store.save(&document).await.map_err(LoadError::Store)?;
        log::info!("Created document {} from {}", document.id, file_name);

        Ok(Self::assemble(store, backend, document, handle, config))
    }

    fn assemble(
        store: Arc<dyn DocumentStore>,
        backend: Arc<dyn PdfBackend>,
        mut document: StoredDocument,
        handle: PdfHandle,
        config: EditorConfig,
    ) -> Self {
        let annotations = std::mem::take(&mut document.annotations);
        let autosaver = AutoSaver::new(config.autosave_quiet_period());
        let mut canvas = Canvas::with_shapes(annotations.clone(), config);
        canvas.pages.set_count(backend.page_count(&handle));
        canvas.pages.go_to(document.current_page);
        document.total_pages = canvas.pages.count();

        Self {
            canvas,
            document,
            handle,
            backend,
            store,
            autosaver,
            renders: RenderTracker::new(),
            background: None,
            save_status: SaveStatus::Saved,
            observed: annotations,
        }
    }

    pub fn id(&self) -> &str {
        &self.document.id
    }

    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn status(&self) -> DocumentStatus {
        self.document.status
    }

    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    pub fn pdf_handle(&self) -> &PdfHandle {
        &self.handle
    }

    pub fn backend(&self) -> &dyn PdfBackend {
        self.backend.as_ref()
    }

    /// Owned backend handle, for work that outlives a borrow of the session.
    pub fn shared_backend(&self) -> Arc<dyn PdfBackend> {
        Arc::clone(&self.backend)
    }

    /// Raster of the displayed page, once rendered.
    pub fn background(&self) -> Option<&PageImage> {
        self.background.as_ref()
    }

    /// Suggested export file stem.
    pub fn default_export_name(&self) -> String {
        format!("{}-export", self.document.name)
    }

    /// The document as it would be persisted right now.
    pub fn snapshot(&self) -> StoredDocument {
        let mut document = self.document.clone();
        document.annotations = self.canvas.document.shapes().to_vec();
        document.current_page = self.canvas.current_page();
        document.total_pages = self.canvas.pages.count();
        document.touch();
        document
    }

    /// Switch pages, invalidating any render still in flight.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if !self.canvas.go_to_page(page) {
            return false;
        }
        self.renders.cancel_all();
        true
    }

    /// Ticket for rendering the displayed page at the live scale.
    pub fn request_render(&self) -> RenderTicket {
        self.renders
            .issue(self.canvas.current_page(), self.canvas.config.live_render_scale)
    }

    pub async fn render(&self, ticket: &RenderTicket) -> Result<PageImage, RenderError> {
        render_ticketed(self.backend.as_ref(), &self.handle, ticket).await
    }

    /// Show a finished render. Stale or off-page results are dropped.
    pub fn install_render(&mut self, ticket: &RenderTicket, image: PageImage) -> bool {
        if !ticket.is_current() || ticket.page != self.canvas.current_page() {
            return false;
        }
        let resized = self.canvas.pages.size() != image.logical_size;
        self.canvas.pages.set_size(image.logical_size);
        self.background = Some(image);
        if resized {
            self.canvas.fit_to_page();
        }
        true
    }

    /// Render and install the displayed page. A superseded render is not an
    /// error and yields `Ok(false)`.
    pub async fn render_current_page(&mut self) -> Result<bool, RenderError> {
        let ticket = self.request_render();
        match self.render(&ticket).await {
            Ok(image) => Ok(self.install_render(&ticket, image)),
            Err(e) if e.is_cancelled() => Ok(false),
            Err(e) => {
                log::error!("Rendering page {} failed: {}", ticket.page, e);
                Err(e)
            }
        }
    }

    /// Note scene edits made since the last check. Returns true if any.
    pub fn sync_changes(&mut self, now: Instant) -> bool {
        if self.canvas.document.shapes() == self.observed.as_slice() {
            return false;
        }
        self.observed = self.canvas.document.shapes().to_vec();
        self.autosaver.note_change(now);
        self.save_status = SaveStatus::Unsaved;
        true
    }

    /// Timer callback: once the scene has been quiet long enough, hand out
    /// a write of the current snapshot for the host to run. The document
    /// status is left as it is. Report the result with
    /// [`autosave_finished`](Self::autosave_finished).
    pub fn tick(&mut self, now: Instant) -> Option<SaveJob> {
        self.sync_changes(now);
        let revision = self.autosaver.begin(now)?;
        self.save_status = SaveStatus::Saving;
        Some(SaveJob::new(Arc::clone(&self.store), self.snapshot(), revision))
    }

    /// Apply a finished autosave. Edits made while it ran stay unsaved.
    pub fn autosave_finished(&mut self, outcome: SaveOutcome, now: Instant) -> bool {
        self.sync_changes(now);
        let saved = self.autosaver.complete(&outcome, now);
        if saved {
            self.document.updated_at = outcome.updated_at;
        }
        self.refresh_save_status();
        saved
    }

    /// Start an explicit save that marks the document as saved.
    pub fn prepare_save(&mut self, now: Instant) -> SaveJob {
        self.sync_changes(now);
        self.save_status = SaveStatus::Saving;
        let mut snapshot = self.snapshot();
        snapshot.status = DocumentStatus::Saved;
        SaveJob::new(Arc::clone(&self.store), snapshot, self.autosaver.revision())
    }

    /// Apply a finished explicit save. On failure the status stays unsaved
    /// and the error is returned.
    pub fn save_finished(&mut self, outcome: SaveOutcome, now: Instant) -> Result<(), StorageError> {
        self.sync_changes(now);
        match outcome.result {
            Ok(()) => {
                self.document.status = outcome.status;
                self.document.updated_at = outcome.updated_at;
                self.autosaver.mark_saved(outcome.revision, now);
                self.refresh_save_status();
                Ok(())
            }
            Err(e) => {
                log::warn!("Saving {} failed: {}", outcome.id, e);
                self.save_status = SaveStatus::Unsaved;
                Err(e)
            }
        }
    }

    /// [`prepare_save`](Self::prepare_save) and
    /// [`save_finished`](Self::save_finished) in one step.
    pub async fn save(&mut self, now: Instant) -> Result<(), StorageError> {
        let outcome = self.prepare_save(now).run().await;
        self.save_finished(outcome, now)
    }

    fn refresh_save_status(&mut self) {
        self.save_status = if self.autosaver.is_dirty() {
            SaveStatus::Unsaved
        } else {
            SaveStatus::Saved
        };
    }
}
