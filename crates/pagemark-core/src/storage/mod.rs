//! Persistence of annotated documents and their source PDFs.

mod autosave;
mod memory;
mod upload;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{AutoSaver, DEFAULT_AUTOSAVE_QUIET_MS, SaveJob, SaveOutcome};
pub use memory::MemoryStore;
pub use upload::{FileUploader, MemoryUploader};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

use crate::shapes::Shape;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for collaborator calls, executor-agnostic and WASM friendly.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Saved,
}

/// A project as persisted: metadata plus the flat annotation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: DocumentStatus,
    /// Where the source PDF can be fetched from.
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Shape>,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    pub updated_at: DateTime<Utc>,
}

fn first_page() -> u32 {
    1
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: DocumentStatus::Draft,
            pdf_url: None,
            annotations: Vec::new(),
            current_page: 1,
            total_pages: 1,
            updated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Bump `updated_at`; last write wins across sessions.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Document persistence backend.
///
/// On native platforms implementations must be Send + Sync.
#[cfg(not(target_arch = "wasm32"))]
pub trait DocumentStore: Send + Sync {
    fn save(&self, document: &StoredDocument) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<StoredDocument>>;

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Ids of every stored document.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

#[cfg(target_arch = "wasm32")]
pub trait DocumentStore {
    fn save(&self, document: &StoredDocument) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<StoredDocument>>;

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Frame, ShapeKind, ShapeStyle};
    use kurbo::Point;

    #[test]
    fn test_stored_document_json() {
        let mut doc = StoredDocument::new("p1", "Floor plan");
        doc.total_pages = 3;
        doc.annotations.push(Shape::new(
            2,
            ShapeStyle::default(),
            ShapeKind::Rectangle(Frame::new(Point::new(1.0, 2.0), 3.0, 4.0)),
        ));
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"status\": \"draft\""));
        let back = StoredDocument::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_missing_fields_default() {
        let doc = StoredDocument::from_json(
            r#"{"id": "p1", "name": "n", "updated_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(doc.status, DocumentStatus::Draft);
        assert!(doc.annotations.is_empty());
        assert_eq!((doc.current_page, doc.total_pages), (1, 1));
    }
}
