//! Session configuration.

/// Tunables for a session, consumed once at [`Workspace`](crate::Workspace)
/// construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Upper bound on the recent-files ledger.
    pub max_recent_files: usize,

    /// Blob-store key the ledger persists under.
    pub recent_files_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { max_recent_files: 30, recent_files_key: "recent_files".to_owned() }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_recent_files(mut self, max: usize) -> Self {
        self.max_recent_files = max;
        self
    }

    pub fn with_recent_files_key(mut self, key: impl Into<String>) -> Self {
        self.recent_files_key = key.into();
        self
    }
}
