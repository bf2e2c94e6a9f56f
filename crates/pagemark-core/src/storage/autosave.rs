//! Debounced automatic persistence.
//!
//! Every scene change restarts a quiet period; once it elapses without
//! further changes the document is written. A failed write is logged and
//! retried after the next quiet period, it never interrupts editing.

use super::{BoxFuture, DocumentStatus, DocumentStore, StorageResult, StoredDocument};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_AUTOSAVE_QUIET_MS: u64 = 2000;

/// An owned write of one snapshot. Holds no borrow of the editor, so the host
/// can keep editing while [`run`](Self::run) is in flight.
pub struct SaveJob {
    store: Arc<dyn DocumentStore>,
    document: StoredDocument,
    revision: u64,
}

/// Result of a [`SaveJob`], handed back to the editor to update its state.
#[derive(Debug)]
pub struct SaveOutcome {
    pub id: String,
    /// Change revision the snapshot covered.
    pub revision: u64,
    pub status: DocumentStatus,
    pub updated_at: DateTime<Utc>,
    pub result: StorageResult<()>,
}

impl SaveJob {
    pub fn new(store: Arc<dyn DocumentStore>, document: StoredDocument, revision: u64) -> Self {
        Self {
            store,
            document,
            revision,
        }
    }

    pub fn document(&self) -> &StoredDocument {
        &self.document
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn run(self) -> BoxFuture<'static, SaveOutcome> {
        Box::pin(async move {
            let result = self.store.save(&self.document).await;
            SaveOutcome {
                id: self.document.id,
                revision: self.revision,
                status: self.document.status,
                updated_at: self.document.updated_at,
                result,
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct AutoSaver {
    quiet: Duration,
    last_change: Option<Instant>,
    dirty: bool,
    last_save: Option<Instant>,
    revision: u64,
    in_flight: bool,
}

impl Default for AutoSaver {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_AUTOSAVE_QUIET_MS))
    }
}

impl AutoSaver {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_change: None,
            dirty: false,
            last_save: None,
            revision: 0,
            in_flight: false,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Record a scene change at `now`, restarting the debounce.
    pub fn note_change(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
        self.revision += 1;
    }

    /// Counter bumped by every noted change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// Dirty, quiet for at least the debounce period and no autosave running.
    pub fn due(&self, now: Instant) -> bool {
        match (self.dirty, self.last_change) {
            (true, Some(changed)) => !self.in_flight && now.saturating_duration_since(changed) >= self.quiet,
            _ => false,
        }
    }

    /// Start an autosave if one is due. Returns the revision it covers.
    pub fn begin(&mut self, now: Instant) -> Option<u64> {
        if !self.due(now) {
            return None;
        }
        self.in_flight = true;
        Some(self.revision)
    }

    /// Apply the result of an autosave started by [`begin`](Self::begin).
    /// Changes noted while it ran keep the saver dirty. Failures are logged
    /// and retried after another quiet period.
    pub fn complete(&mut self, outcome: &SaveOutcome, now: Instant) -> bool {
        self.in_flight = false;
        match &outcome.result {
            Ok(()) => {
                log::debug!("Autosaved document {}", outcome.id);
                self.mark_saved(outcome.revision, now);
                true
            }
            Err(e) => {
                log::error!("Autosave of {} failed: {}", outcome.id, e);
                self.last_change = Some(now);
                false
            }
        }
    }

    /// A save covering changes up to `revision` succeeded.
    pub fn mark_saved(&mut self, revision: u64, now: Instant) {
        if revision >= self.revision {
            self.dirty = false;
        }
        self.last_save = Some(now);
    }
}
