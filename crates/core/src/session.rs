//! Session store: the live set of open documents.
//!
//! Owns every `Document` (tabs only ever hold a document id), the active
//! document pointer, the current page pointer, and the loading/error flag
//! pair. All methods take `&self`: state lives behind one mutex, every
//! mutation happens inside a single lock acquisition, and reads hand out
//! cloned snapshots. Observers see pre- or post-mutation state, never a torn
//! one.

use crate::error::{SessionError, SessionResult};
use doc_engine::ParseHandle;
use doc_model::{Annotation, AnnotationId, Bookmark, DocumentId, DocumentInfo};
use std::collections::HashMap;
use std::sync::Mutex;

/// A live open document: summary info plus the engine handle it was parsed
/// into, its annotations, and both bookmark lists.
#[derive(Debug, Clone)]
pub struct Document {
    pub info: DocumentInfo,
    pub handle: ParseHandle,
    pub annotations: HashMap<AnnotationId, Annotation>,
    pub user_bookmarks: Vec<Bookmark>,
    /// Filled on the first successful native-bookmark fetch; `None` until
    /// then so a failed fetch can be retried.
    pub native_bookmarks: Option<Vec<Bookmark>>,
}

impl Document {
    pub fn new(info: DocumentInfo, handle: ParseHandle) -> Self {
        Self {
            info,
            handle,
            annotations: HashMap::new(),
            user_bookmarks: Vec::new(),
            native_bookmarks: None,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    documents: HashMap<DocumentId, Document>,
    active_document: Option<DocumentId>,
    current_page: u32,
    loading: bool,
    error: Option<String>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    state: Mutex<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&self, document: Document) {
        let mut state = self.state.lock().unwrap();
        state.documents.insert(document.info.id.clone(), document);
    }

    /// Removes the document and returns it (the caller still needs the engine
    /// handle to release backend resources). Removing the active document
    /// clears the active pointer; callers re-select a replacement.
    pub fn remove_document(&self, id: &str) -> SessionResult<Document> {
        let mut state = self.state.lock().unwrap();
        let document = state
            .documents
            .remove(id)
            .ok_or_else(|| SessionError::DocumentNotFound { id: id.to_owned() })?;

        if state.active_document.as_deref() == Some(id) {
            state.active_document = None;
            state.current_page = 0;
        }

        Ok(document)
    }

    pub fn document(&self, id: &str) -> SessionResult<Document> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::DocumentNotFound { id: id.to_owned() })
    }

    pub fn info(&self, id: &str) -> SessionResult<DocumentInfo> {
        self.document(id).map(|doc| doc.info)
    }

    pub fn infos(&self) -> Vec<DocumentInfo> {
        self.state.lock().unwrap().documents.values().map(|doc| doc.info.clone()).collect()
    }

    pub fn document_count(&self) -> usize {
        self.state.lock().unwrap().documents.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.lock().unwrap().documents.contains_key(id)
    }

    /// Makes `id` the active document and rewinds the page pointer.
    pub fn set_current_document(&self, id: &str) -> SessionResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.documents.contains_key(id) {
            return Err(SessionError::DocumentNotFound { id: id.to_owned() });
        }
        state.active_document = Some(id.to_owned());
        state.current_page = 0;
        Ok(())
    }

    pub fn active_document_id(&self) -> Option<DocumentId> {
        self.state.lock().unwrap().active_document.clone()
    }

    pub fn active_document(&self) -> Option<Document> {
        let state = self.state.lock().unwrap();
        let id = state.active_document.as_ref()?;
        state.documents.get(id).cloned()
    }

    /// Sets the page pointer, clamped to the active document's page range.
    /// With no active document (or a zero-page document) the pointer is 0.
    /// Returns the effective value.
    pub fn set_current_page(&self, page: u32) -> u32 {
        let mut state = self.state.lock().unwrap();
        let page_count = state
            .active_document
            .as_ref()
            .and_then(|id| state.documents.get(id))
            .map(|doc| doc.info.page_count)
            .unwrap_or(0);

        state.current_page = if page_count == 0 { 0 } else { page.min(page_count - 1) };
        state.current_page
    }

    pub fn current_page(&self) -> u32 {
        self.state.lock().unwrap().current_page
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.lock().unwrap().loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().loading
    }

    pub fn set_error(&self, error: Option<String>) {
        self.state.lock().unwrap().error = error;
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().unwrap().error.clone()
    }

    /// Page-editor hook: records the engine-confirmed page count.
    pub fn update_page_count(&self, id: &str, page_count: u32) -> SessionResult<()> {
        let mut state = self.state.lock().unwrap();
        let document = state
            .documents
            .get_mut(id)
            .ok_or_else(|| SessionError::DocumentNotFound { id: id.to_owned() })?;
        document.info.page_count = page_count;
        Ok(())
    }

    // Annotation ids live both as the map key and inside the value; always
    // insert under `annotation.id` to keep the two in lockstep.
    pub fn add_annotation(&self, document_id: &str, annotation: Annotation) -> SessionResult<()> {
        let mut state = self.state.lock().unwrap();
        let document = state
            .documents
            .get_mut(document_id)
            .ok_or_else(|| SessionError::DocumentNotFound { id: document_id.to_owned() })?;
        document.annotations.insert(annotation.id.clone(), annotation);
        Ok(())
    }

    /// Replaces an existing annotation wholesale, matched by id.
    pub fn update_annotation(
        &self,
        document_id: &str,
        annotation: Annotation,
    ) -> SessionResult<()> {
        let mut state = self.state.lock().unwrap();
        let document = state
            .documents
            .get_mut(document_id)
            .ok_or_else(|| SessionError::DocumentNotFound { id: document_id.to_owned() })?;
        if !document.annotations.contains_key(&annotation.id) {
            return Err(SessionError::AnnotationNotFound { id: annotation.id });
        }
        document.annotations.insert(annotation.id.clone(), annotation);
        Ok(())
    }

    pub fn remove_annotation(
        &self,
        document_id: &str,
        annotation_id: &str,
    ) -> SessionResult<Annotation> {
        let mut state = self.state.lock().unwrap();
        let document = state
            .documents
            .get_mut(document_id)
            .ok_or_else(|| SessionError::DocumentNotFound { id: document_id.to_owned() })?;
        document
            .annotations
            .remove(annotation_id)
            .ok_or_else(|| SessionError::AnnotationNotFound { id: annotation_id.to_owned() })
    }

    pub fn annotation(&self, document_id: &str, annotation_id: &str) -> SessionResult<Annotation> {
        self.document(document_id)?
            .annotations
            .get(annotation_id)
            .cloned()
            .ok_or_else(|| SessionError::AnnotationNotFound { id: annotation_id.to_owned() })
    }

    /// All annotations of a document, ordered by page then id so consumers
    /// see a stable sequence.
    pub fn annotations(&self, document_id: &str) -> SessionResult<Vec<Annotation>> {
        let document = self.document(document_id)?;
        let mut annotations: Vec<Annotation> = document.annotations.into_values().collect();
        annotations.sort_by(|a, b| (a.page_number, &a.id).cmp(&(b.page_number, &b.id)));
        Ok(annotations)
    }

    pub fn add_user_bookmark(&self, document_id: &str, bookmark: Bookmark) -> SessionResult<()> {
        let mut state = self.state.lock().unwrap();
        let document = state
            .documents
            .get_mut(document_id)
            .ok_or_else(|| SessionError::DocumentNotFound { id: document_id.to_owned() })?;
        document.user_bookmarks.push(bookmark);
        Ok(())
    }

    pub fn remove_user_bookmark(
        &self,
        document_id: &str,
        bookmark_id: &str,
    ) -> SessionResult<Bookmark> {
        let mut state = self.state.lock().unwrap();
        let document = state
            .documents
            .get_mut(document_id)
            .ok_or_else(|| SessionError::DocumentNotFound { id: document_id.to_owned() })?;
        let index = document
            .user_bookmarks
            .iter()
            .position(|bookmark| bookmark.id == bookmark_id)
            .ok_or_else(|| SessionError::BookmarkNotFound { id: bookmark_id.to_owned() })?;
        Ok(document.user_bookmarks.remove(index))
    }

    pub fn user_bookmarks(&self, document_id: &str) -> SessionResult<Vec<Bookmark>> {
        self.document(document_id).map(|doc| doc.user_bookmarks)
    }

    pub fn cache_native_bookmarks(
        &self,
        document_id: &str,
        bookmarks: Vec<Bookmark>,
    ) -> SessionResult<()> {
        let mut state = self.state.lock().unwrap();
        let document = state
            .documents
            .get_mut(document_id)
            .ok_or_else(|| SessionError::DocumentNotFound { id: document_id.to_owned() })?;
        document.native_bookmarks = Some(bookmarks);
        Ok(())
    }

    pub fn native_bookmarks(&self, document_id: &str) -> SessionResult<Option<Vec<Bookmark>>> {
        self.document(document_id).map(|doc| doc.native_bookmarks)
    }

    pub fn is_active(&self, document_id: &str) -> bool {
        self.state.lock().unwrap().active_document.as_deref() == Some(document_id)
    }

    pub fn clear_error(&self) {
        self.set_error(None);
    }
}
