//! Session-scoped identifier generation.
//!
//! Ids only have to be unique within one running session: a millisecond
//! timestamp plus a strictly increasing sequence plus a v4 UUID fragment.
//! Nothing here is cryptographic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Mints opaque string identifiers like `doc-18f2a4c91b3-2-9f3d20aa`.
///
/// The sequence component makes ids unique even when two are minted inside
/// the same millisecond; the UUID fragment keeps them distinguishable across
/// sessions.
#[derive(Debug, Default)]
pub struct IdGenerator {
    sequence: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, prefix: &str) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let entropy = uuid::Uuid::new_v4().simple().to_string();
        format!("{prefix}-{:x}-{seq:x}-{}", now_ms(), &entropy[..8])
    }
}
