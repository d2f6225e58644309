//! Shared test doubles: a scripted parse engine, a notification recorder,
//! and a blob store whose writes always fail.

use crate::notify::{NotificationSink, Severity};
use crate::session::Document;
use doc_engine::{
    lookup, lookup_mut, ExtractedAnnotation, ExtractedBookmark, HandleAllocator, ParseEngine,
    ParseEngineError, ParseHandle,
};
use doc_model::{Annotation, AnnotationRect, Color, DocumentInfo, RecentFileEntry};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use storage::{BlobStore, StorageError};

#[derive(Debug, Clone)]
struct FakeDocument {
    page_count: u32,
    annotations: HashMap<u32, Vec<ExtractedAnnotation>>,
    bookmarks: Vec<ExtractedBookmark>,
}

/// Scripted in-memory parse engine. Every parsed document follows the same
/// script, configured before the engine moves into the workspace.
pub(crate) struct FakeParseEngine {
    alloc: HandleAllocator,
    docs: HashMap<ParseHandle, FakeDocument>,
    page_count: u32,
    annotations: HashMap<u32, Vec<ExtractedAnnotation>>,
    bookmarks: Vec<ExtractedBookmark>,
    parse_failure: Option<String>,
    failing_pages: HashSet<u32>,
    bookmarks_fail: bool,
    closed: Arc<Mutex<Vec<u64>>>,
}

impl FakeParseEngine {
    pub fn with_pages(page_count: u32) -> Self {
        Self {
            alloc: HandleAllocator::new(),
            docs: HashMap::new(),
            page_count,
            annotations: HashMap::new(),
            bookmarks: Vec::new(),
            parse_failure: None,
            failing_pages: HashSet::new(),
            bookmarks_fail: false,
            closed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_with(message: &str) -> Self {
        let mut engine = Self::with_pages(0);
        engine.parse_failure = Some(message.to_owned());
        engine
    }

    pub fn annotate_page(mut self, page_index: u32, count: usize) -> Self {
        let list = (0..count)
            .map(|i| ExtractedAnnotation {
                page_index,
                x: 10.0 * i as f32,
                y: 20.0,
                width: 100.0,
                height: 16.0,
                content: format!("note {i} on page {page_index}"),
                color: [255, 214, 51, 255],
            })
            .collect();
        self.annotations.insert(page_index, list);
        self
    }

    pub fn failing_on_page(mut self, page_index: u32) -> Self {
        self.failing_pages.insert(page_index);
        self
    }

    pub fn with_native_bookmark(mut self, page_index: u32, title: &str) -> Self {
        self.bookmarks.push(ExtractedBookmark { page_index, title: title.to_owned() });
        self
    }

    pub fn with_failing_bookmarks(mut self) -> Self {
        self.bookmarks_fail = true;
        self
    }

    /// Handle ids passed to `close`, shared with the test.
    pub fn closed_handles(&self) -> Arc<Mutex<Vec<u64>>> {
        self.closed.clone()
    }
}

impl ParseEngine for FakeParseEngine {
    fn parse(&mut self, _bytes: Vec<u8>) -> Result<ParseHandle, ParseEngineError> {
        if let Some(message) = &self.parse_failure {
            return Err(ParseEngineError::Parse(message.clone()));
        }
        let handle = self.alloc.next();
        self.docs.insert(
            handle,
            FakeDocument {
                page_count: self.page_count,
                annotations: self.annotations.clone(),
                bookmarks: self.bookmarks.clone(),
            },
        );
        Ok(handle)
    }

    fn page_count(&self, handle: ParseHandle) -> Result<u32, ParseEngineError> {
        Ok(lookup(&self.docs, handle)?.page_count)
    }

    fn annotations(
        &self,
        handle: ParseHandle,
        page_index: u32,
    ) -> Result<Vec<ExtractedAnnotation>, ParseEngineError> {
        let doc = lookup(&self.docs, handle)?;
        if self.failing_pages.contains(&page_index) {
            return Err(ParseEngineError::Extraction {
                page: page_index,
                message: "damaged annotation stream".to_owned(),
            });
        }
        if page_index >= doc.page_count {
            return Err(ParseEngineError::PageOutOfRange {
                page: page_index,
                page_count: doc.page_count,
            });
        }
        Ok(doc.annotations.get(&page_index).cloned().unwrap_or_default())
    }

    fn bookmarks(&self, handle: ParseHandle) -> Result<Vec<ExtractedBookmark>, ParseEngineError> {
        let doc = lookup(&self.docs, handle)?;
        if self.bookmarks_fail {
            return Err(ParseEngineError::Bookmarks("outline table damaged".to_owned()));
        }
        Ok(doc.bookmarks.clone())
    }

    fn delete_pages(
        &mut self,
        handle: ParseHandle,
        indices: &[u32],
    ) -> Result<(), ParseEngineError> {
        let doc = lookup_mut(&mut self.docs, handle)?;
        let unique: HashSet<u32> = indices.iter().copied().collect();
        if let Some(&page) = unique.iter().find(|&&page| page >= doc.page_count) {
            return Err(ParseEngineError::PageOutOfRange { page, page_count: doc.page_count });
        }
        doc.page_count -= unique.len() as u32;
        Ok(())
    }

    fn insert_blank_page(
        &mut self,
        handle: ParseHandle,
        index: u32,
    ) -> Result<(), ParseEngineError> {
        let doc = lookup_mut(&mut self.docs, handle)?;
        if index > doc.page_count {
            return Err(ParseEngineError::PageOutOfRange {
                page: index,
                page_count: doc.page_count,
            });
        }
        doc.page_count += 1;
        Ok(())
    }

    fn close(&mut self, handle: ParseHandle) -> Result<(), ParseEngineError> {
        self.closed.lock().unwrap().push(handle.raw());
        self.docs
            .remove(&handle)
            .map(|_| ())
            .ok_or(ParseEngineError::InvalidHandle(handle.raw()))
    }
}

/// Notification sink that records everything it is handed.
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages.lock().unwrap().push((message.to_owned(), severity));
    }
}

/// Blob store whose reads find nothing and whose writes always fail.
#[derive(Debug, Default)]
pub(crate) struct FailingStore;

impl BlobStore for FailingStore {
    fn read_blob(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(None)
    }

    fn write_blob(&self, _key: &str, _bytes: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk full")))
    }
}

pub(crate) fn document_with_pages(id: &str, page_count: u32) -> Document {
    let info = DocumentInfo {
        id: id.to_owned(),
        name: format!("{id}.pdf"),
        byte_size: 1024,
        page_count,
        source_path: None,
    };
    Document::new(info, HandleAllocator::new().next())
}

pub(crate) fn annotation_on_page(id: &str, page_number: u32) -> Annotation {
    Annotation {
        id: id.to_owned(),
        page_number,
        rect: AnnotationRect::new(10.0, 10.0, 100.0, 20.0),
        content: "note".to_owned(),
        color: Color::default(),
    }
}

pub(crate) fn recent_entry(path: &str, last_opened_ms: u64) -> RecentFileEntry {
    let path = PathBuf::from(path);
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    RecentFileEntry { path, name, last_opened_ms, thumbnail_path: None }
}
