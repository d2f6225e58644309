//! Page editing façade.
//!
//! Validates page insert/delete requests, delegates the mutation to the
//! parsing engine, records the new page count, and repairs the session's
//! current-page pointer afterwards. Validation failures are rejected before
//! the engine is touched.

use crate::error::{SessionError, SessionResult};
use crate::loader::SharedEngine;
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::debug;

pub struct PageEditor {
    engine: SharedEngine,
    session: Arc<SessionStore>,
}

impl PageEditor {
    pub(crate) fn new(engine: SharedEngine, session: Arc<SessionStore>) -> Self {
        Self { engine, session }
    }

    /// Deletes the given page indices. A request that would leave the
    /// document without pages, names an out-of-range index, or names no
    /// pages at all is rejected as a validation failure. Returns the new
    /// page count.
    pub fn delete_pages(&self, document_id: &str, indices: &[u32]) -> SessionResult<u32> {
        let document = self.session.document(document_id)?;
        let page_count = document.info.page_count;

        let mut unique: Vec<u32> = indices.to_vec();
        unique.sort_unstable();
        unique.dedup();

        if unique.is_empty() {
            return Err(SessionError::validation("no pages selected for deletion"));
        }
        if let Some(&page) = unique.iter().find(|&&page| page >= page_count) {
            return Err(SessionError::validation(format!(
                "page index {page} out of range (page_count={page_count})"
            )));
        }
        if unique.len() as u32 >= page_count {
            return Err(SessionError::validation(
                "a document must keep at least one page",
            ));
        }

        self.engine.lock().unwrap().delete_pages(document.handle, &unique)?;

        let new_count = page_count - unique.len() as u32;
        self.session.update_page_count(document_id, new_count)?;
        if self.session.is_active(document_id) {
            // Re-setting the pointer clamps it into the shrunk range.
            let repaired = self.session.set_current_page(self.session.current_page());
            debug!(id = %document_id, new_count, repaired, "pages deleted");
        }

        Ok(new_count)
    }

    /// Inserts a blank page at `at_index` (0-based; `page_count` appends) and
    /// moves the pointer to the inserted page when the document is active.
    /// Returns the new page count.
    pub fn insert_blank_page(&self, document_id: &str, at_index: u32) -> SessionResult<u32> {
        let document = self.session.document(document_id)?;
        let page_count = document.info.page_count;

        if at_index > page_count {
            return Err(SessionError::validation(format!(
                "insert index {at_index} out of range (page_count={page_count})"
            )));
        }

        self.engine.lock().unwrap().insert_blank_page(document.handle, at_index)?;

        let new_count = page_count + 1;
        self.session.update_page_count(document_id, new_count)?;
        if self.session.is_active(document_id) {
            self.session.set_current_page(at_index);
            debug!(id = %document_id, new_count, at_index, "blank page inserted");
        }

        Ok(new_count)
    }
}
