//! In-memory document store.

use super::{BoxFuture, DocumentStore, StorageError, StorageResult, StoredDocument};
use std::collections::HashMap;
use std::sync::RwLock;

/// Keeps documents in a map. Used by tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. with documents from an earlier session.
    pub fn with_documents(documents: impl IntoIterator<Item = StoredDocument>) -> Self {
        Self {
            documents: RwLock::new(documents.into_iter().map(|d| (d.id.clone(), d)).collect()),
        }
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl DocumentStore for MemoryStore {
    fn save(&self, document: &StoredDocument) -> BoxFuture<'_, StorageResult<()>> {
        let document = document.clone();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.insert(document.id.clone(), document);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<StoredDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            docs.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut docs = self.documents.write().map_err(lock_error)?;
            docs.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let docs = self.documents.read().map_err(lock_error)?;
            Ok(docs.contains_key(&id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;

    #[test]
    fn test_save_and_load() {
        let store = MemoryStore::new();
        let doc = StoredDocument::new("test", "Site survey");

        block_on(store.save(&doc)).unwrap();
        let loaded = block_on(store.load("test")).unwrap();

        assert_eq!(loaded.name, "Site survey");
    }

    #[test]
    fn test_not_found() {
        let store = MemoryStore::new();
        let result = block_on(store.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_delete_and_exists() {
        let store = MemoryStore::with_documents([StoredDocument::new("test", "n")]);

        assert!(block_on(store.exists("test")).unwrap());
        block_on(store.delete("test")).unwrap();
        assert!(!block_on(store.exists("test")).unwrap());
    }

    #[test]
    fn test_save_overwrites() {
        let store = MemoryStore::new();
        let mut doc = StoredDocument::new("doc1", "first");
        block_on(store.save(&doc)).unwrap();
        doc.name = "second".into();
        block_on(store.save(&doc)).unwrap();

        let list = block_on(store.list()).unwrap();
        assert_eq!(list, vec!["doc1".to_string()]);
        assert_eq!(block_on(store.load("doc1")).unwrap().name, "second");
    }
}
