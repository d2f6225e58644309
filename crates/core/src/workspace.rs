//! Workspace: the session context object.
//!
//! Constructed once at application start and handed to the UI layer; wires
//! the id generator, session store, tab registry, recent-files ledger,
//! clipboard, loader, and page editor around one parse engine and one blob
//! store. Nothing in here is a singleton; the boundary layer may hold it as
//! one, but the engine's contracts are against this injected context.

use crate::bookmarks::merge_bookmarks;
use crate::cancel::CancellationToken;
use crate::clipboard::ClipboardSlot;
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::ids::{now_ms, IdGenerator};
use crate::loader::{DocumentLoader, SharedEngine};
use crate::notify::{NotificationSink, Severity};
use crate::pages::PageEditor;
use crate::recent::RecentFilesLedger;
use crate::session::SessionStore;
use crate::tabs::TabRegistry;
use doc_engine::ParseEngine;
use doc_model::{
    Annotation, AnnotationRect, Bookmark, BookmarkSource, Color, DocumentInfo, RecentFileEntry,
    Tab,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

pub struct Workspace {
    engine: SharedEngine,
    ids: Arc<IdGenerator>,
    session: Arc<SessionStore>,
    tabs: Arc<TabRegistry>,
    recent: Arc<RecentFilesLedger>,
    clipboard: ClipboardSlot,
    loader: DocumentLoader,
    pages: PageEditor,
    notifier: Arc<dyn NotificationSink>,
}

impl Workspace {
    pub fn new(
        engine: Box<dyn ParseEngine>,
        blob_store: Arc<dyn storage::BlobStore>,
        config: SessionConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let engine: SharedEngine = Arc::new(Mutex::new(engine));
        let ids = Arc::new(IdGenerator::new());
        let session = Arc::new(SessionStore::new());
        let tabs = Arc::new(TabRegistry::new());
        let recent = Arc::new(RecentFilesLedger::new(blob_store, notifier.clone(), &config));
        let loader = DocumentLoader::new(
            engine.clone(),
            ids.clone(),
            session.clone(),
            tabs.clone(),
            recent.clone(),
            notifier.clone(),
        );
        let pages = PageEditor::new(engine.clone(), session.clone());

        Self {
            engine,
            ids,
            session,
            tabs,
            recent,
            clipboard: ClipboardSlot::new(),
            loader,
            pages,
            notifier,
        }
    }

    // --- documents -------------------------------------------------------

    pub fn load_document(
        &self,
        bytes: Vec<u8>,
        name: &str,
        source_path: Option<PathBuf>,
        cancel: &CancellationToken,
    ) -> SessionResult<DocumentInfo> {
        self.loader.load_document(bytes, name, source_path, cancel)
    }

    /// Closes a document: releases its engine handle, drops every tab bound
    /// to it, and, when it was the active document, re-selects the first
    /// remaining tab's document.
    pub fn close_document(&self, id: &str) -> SessionResult<()> {
        let document = self.session.remove_document(id)?;
        if let Err(err) = self.engine.lock().unwrap().close(document.handle) {
            warn!(error = %err, id = %id, "engine refused to release handle");
        }
        self.tabs.remove_tabs_for_document(id);

        if self.session.active_document_id().is_none() {
            if let Some(tab) = self.tabs.tabs().first() {
                self.session.set_current_document(&tab.document_id)?;
            }
        }
        Ok(())
    }

    pub fn set_current_document(&self, id: &str) -> SessionResult<()> {
        self.session.set_current_document(id)
    }

    pub fn set_current_page(&self, page: u32) -> u32 {
        self.session.set_current_page(page)
    }

    pub fn current_document(&self) -> Option<DocumentInfo> {
        self.session.active_document().map(|doc| doc.info)
    }

    pub fn current_page(&self) -> u32 {
        self.session.current_page()
    }

    pub fn document(&self, id: &str) -> SessionResult<DocumentInfo> {
        self.session.info(id)
    }

    pub fn documents(&self) -> Vec<DocumentInfo> {
        self.session.infos()
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.session.error()
    }

    // --- bookmarks -------------------------------------------------------

    /// The document's display bookmark list: engine-native entries merged
    /// with user entries, deduplicated by `(page, title)` with native
    /// entries winning. Native bookmarks are fetched from the engine on
    /// first call and cached; a failed fetch degrades to the user list and
    /// is retried next time.
    pub fn merged_bookmarks(&self, document_id: &str) -> SessionResult<Vec<Bookmark>> {
        let document = self.session.document(document_id)?;

        let native = match document.native_bookmarks {
            Some(native) => native,
            None => {
                // Bind before matching so the engine guard drops here.
                let fetched = self.engine.lock().unwrap().bookmarks(document.handle);
                match fetched {
                    Ok(extracted) => {
                        let native: Vec<Bookmark> = extracted
                            .into_iter()
                            .map(|raw| Bookmark {
                                id: self.ids.next("bm"),
                                page_number: raw.page_index,
                                title: raw.title,
                                created_at_ms: now_ms(),
                                source: BookmarkSource::Native,
                            })
                            .collect();
                        self.session.cache_native_bookmarks(document_id, native.clone())?;
                        native
                    }
                    Err(err) => {
                        let failure = SessionError::Engine(err);
                        warn!(error = %failure, "native bookmark fetch failed, merging user list only");
                        self.notifier.notify(&failure.to_string(), Severity::Warning);
                        Vec::new()
                    }
                }
            }
        };

        Ok(merge_bookmarks(&native, &document.user_bookmarks))
    }

    pub fn add_bookmark(
        &self,
        document_id: &str,
        page_number: u32,
        title: impl Into<String>,
    ) -> SessionResult<Bookmark> {
        let title = title.into();
        let document = self.session.document(document_id)?;

        if page_number >= document.info.page_count.max(1) {
            return Err(SessionError::validation(format!(
                "bookmark page {page_number} out of range (page_count={})",
                document.info.page_count
            )));
        }
        let duplicate = document
            .user_bookmarks
            .iter()
            .any(|existing| existing.dedup_key() == (page_number, title.as_str()));
        if duplicate {
            return Err(SessionError::validation(format!(
                "a bookmark named {title:?} already exists on page {page_number}"
            )));
        }

        let bookmark = Bookmark {
            id: self.ids.next("bm"),
            page_number,
            title,
            created_at_ms: now_ms(),
            source: BookmarkSource::User,
        };
        self.session.add_user_bookmark(document_id, bookmark.clone())?;
        Ok(bookmark)
    }

    pub fn remove_bookmark(&self, document_id: &str, bookmark_id: &str) -> SessionResult<Bookmark> {
        self.session.remove_user_bookmark(document_id, bookmark_id)
    }

    // --- annotations -----------------------------------------------------

    pub fn add_annotation(
        &self,
        document_id: &str,
        page_number: u32,
        rect: AnnotationRect,
        content: impl Into<String>,
        color: Color,
    ) -> SessionResult<Annotation> {
        let annotation = Annotation {
            id: self.ids.next("ann"),
            page_number,
            rect,
            content: content.into(),
            color,
        };
        self.session.add_annotation(document_id, annotation.clone())?;
        Ok(annotation)
    }

    pub fn update_annotation(
        &self,
        document_id: &str,
        annotation: Annotation,
    ) -> SessionResult<()> {
        self.session.update_annotation(document_id, annotation)
    }

    pub fn remove_annotation(
        &self,
        document_id: &str,
        annotation_id: &str,
    ) -> SessionResult<Annotation> {
        self.session.remove_annotation(document_id, annotation_id)
    }

    pub fn annotations(&self, document_id: &str) -> SessionResult<Vec<Annotation>> {
        self.session.annotations(document_id)
    }

    // --- clipboard -------------------------------------------------------

    /// Copies an existing annotation into the clipboard slot under a fresh
    /// id and returns the stored snapshot.
    pub fn copy_annotation(
        &self,
        document_id: &str,
        annotation_id: &str,
    ) -> SessionResult<Annotation> {
        let annotation = self.session.annotation(document_id, annotation_id)?;
        Ok(self.clipboard.copy(&annotation, &self.ids))
    }

    pub fn paste_annotation(&self) -> Option<Annotation> {
        self.clipboard.paste()
    }

    pub fn has_clipboard_content(&self) -> bool {
        self.clipboard.has_content()
    }

    pub fn clear_clipboard(&self) {
        self.clipboard.clear()
    }

    // --- tabs ------------------------------------------------------------

    /// Opens an extra tab onto an already-open document.
    pub fn add_tab(&self, document_id: &str, name: &str) -> SessionResult<Tab> {
        if !self.session.contains(document_id) {
            return Err(SessionError::DocumentNotFound { id: document_id.to_owned() });
        }
        Ok(self.tabs.add_tab(&self.ids, document_id, name))
    }

    pub fn remove_tab(&self, tab_id: &str) -> SessionResult<Tab> {
        self.tabs.remove_tab(tab_id)
    }

    pub fn reorder_tab(&self, tab_id: &str, new_index: usize) -> SessionResult<()> {
        self.tabs.reorder_tab(tab_id, new_index)
    }

    pub fn set_tab_modified(&self, tab_id: &str, is_modified: bool) -> SessionResult<()> {
        self.tabs.set_modified(tab_id, is_modified)
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.tabs.tabs()
    }

    // --- pages -----------------------------------------------------------

    pub fn delete_pages(&self, document_id: &str, indices: &[u32]) -> SessionResult<u32> {
        self.pages.delete_pages(document_id, indices)
    }

    pub fn insert_blank_page(&self, document_id: &str, at_index: u32) -> SessionResult<u32> {
        self.pages.insert_blank_page(document_id, at_index)
    }

    // --- recent files ----------------------------------------------------

    pub fn recent_files(&self) -> Vec<RecentFileEntry> {
        self.recent.list()
    }

    pub fn add_recent_file(&self, entry: RecentFileEntry) {
        self.recent.add(entry)
    }

    pub fn remove_recent_file(&self, path: &Path) -> bool {
        self.recent.remove(path)
    }

    pub fn clear_recent_files(&self) {
        self.recent.clear()
    }
}
