//! Source PDF upload and retrieval.

use super::{BoxFuture, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Blob storage for the PDFs documents are built on.
#[cfg(not(target_arch = "wasm32"))]
pub trait FileUploader: Send + Sync {
    /// Store `bytes` under a fresh key derived from `file_name`, returning its URL.
    fn upload<'a>(&'a self, file_name: &'a str, bytes: &'a [u8]) -> BoxFuture<'a, StorageResult<String>>;

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StorageResult<Vec<u8>>>;
}

#[cfg(target_arch = "wasm32")]
pub trait FileUploader {
    fn upload<'a>(&'a self, file_name: &'a str, bytes: &'a [u8]) -> BoxFuture<'a, StorageResult<String>>;

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StorageResult<Vec<u8>>>;
}

const MEMORY_SCHEME: &str = "memory://uploads/";

/// Keeps uploads in memory under `memory://uploads/` URLs.
#[derive(Default)]
pub struct MemoryUploader {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unique object key keeping the original extension.
fn object_key(file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "pdf".to_string());
    format!("{}.{}", Uuid::new_v4(), ext)
}

impl FileUploader for MemoryUploader {
    fn upload<'a>(&'a self, file_name: &'a str, bytes: &'a [u8]) -> BoxFuture<'a, StorageResult<String>> {
        Box::pin(async move {
            if bytes.is_empty() {
                return Err(StorageError::Other(format!("Refusing to upload empty file {}", file_name)));
            }
            let url = format!("{}{}", MEMORY_SCHEME, object_key(file_name));
            let mut files = self
                .files
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            files.insert(url.clone(), bytes.to_vec());
            Ok(url)
        })
    }

    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, StorageResult<Vec<u8>>> {
        Box::pin(async move {
            let files = self
                .files
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            files
                .get(url)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(url.to_string()))
        })
    }
}
