//! Recently-opened files ledger.
//!
//! Bounded, deduplicated-by-path, recency-ordered history, persisted through
//! the blob store on every mutation and read back on construction. Durable
//! writes are best-effort: a failed write is logged and notified, but the
//! in-memory mutation stands.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::notify::{NotificationSink, Severity};
use doc_model::RecentFileEntry;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use storage::BlobStore;
use tracing::warn;

const RECENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RecentFilesEnvelope {
    version: u32,
    entries: Vec<RecentFileEntry>,
}

pub struct RecentFilesLedger {
    entries: Mutex<Vec<RecentFileEntry>>,
    store: Arc<dyn BlobStore>,
    notifier: Arc<dyn NotificationSink>,
    key: String,
    max_entries: usize,
}

impl RecentFilesLedger {
    /// Builds the ledger, seeding it from the blob store. An absent blob
    /// starts empty; an undecodable or unsupported one is logged and also
    /// starts empty rather than failing session start.
    pub fn new(
        store: Arc<dyn BlobStore>,
        notifier: Arc<dyn NotificationSink>,
        config: &SessionConfig,
    ) -> Self {
        let entries = match storage::read_json::<RecentFilesEnvelope>(
            store.as_ref(),
            &config.recent_files_key,
        ) {
            Ok(Some(envelope)) if envelope.version == RECENT_SCHEMA_VERSION => {
                let mut entries = envelope.entries;
                entries.truncate(config.max_recent_files);
                entries
            }
            Ok(Some(envelope)) => {
                warn!(version = envelope.version, "unsupported recent-files schema, starting empty");
                Vec::new()
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "could not load recent files, starting empty");
                Vec::new()
            }
        };

        Self {
            entries: Mutex::new(entries),
            store,
            notifier,
            key: config.recent_files_key.clone(),
            max_entries: config.max_recent_files,
        }
    }

    /// Records a file as just opened: any entry with the same path moves to
    /// the front (replaced by the new entry), and the list is truncated to
    /// the configured bound.
    pub fn add(&self, entry: RecentFileEntry) {
        {
            let mut entries = self.entries.lock().unwrap();
            entries.retain(|existing| existing.path != entry.path);
            entries.insert(0, entry);
            entries.truncate(self.max_entries);
        }
        self.persist();
    }

    /// Removes the entry with the given path. Returns whether one existed.
    pub fn remove(&self, path: &Path) -> bool {
        let removed = {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|entry| entry.path != path);
            entries.len() != before
        };
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
        self.persist();
    }

    /// Entries sorted most-recently-opened first. Storage keeps insertion
    /// order; the recency sort happens here at read time.
    pub fn list(&self) -> Vec<RecentFileEntry> {
        let mut entries = self.entries.lock().unwrap().clone();
        entries.sort_by(|a, b| b.last_opened_ms.cmp(&a.last_opened_ms));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    // Serializes the whole bounded list. Never holds the entry lock across
    // the store call, and never propagates the failure: the ledger's
    // in-memory state is the source of truth for this session.
    fn persist(&self) {
        let entries = self.entries.lock().unwrap().clone();
        let envelope = RecentFilesEnvelope { version: RECENT_SCHEMA_VERSION, entries };

        if let Err(err) = storage::write_json(self.store.as_ref(), &self.key, &envelope) {
            let failure =
                SessionError::Persistence { what: "recent files", message: err.to_string() };
            warn!(error = %failure, "recent-files write failed");
            self.notifier.notify(&failure.to_string(), Severity::Warning);
        }
    }
}
