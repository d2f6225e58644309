use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifiers are opaque strings minted by the session id generator.
pub type DocumentId = String;
pub type TabId = String;
pub type AnnotationId = String;
pub type BookmarkId = String;

/// RGBA color attached to an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(255, 214, 51)
    }
}

/// Axis-aligned annotation bounds in page-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl AnnotationRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// One annotation, whether extracted from the file or created by the user.
/// Both origins share this shape; ownership lives with the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub page_number: u32,
    pub rect: AnnotationRect,
    pub content: String,
    pub color: Color,
}

/// Where a bookmark came from. Native bookmarks are read out of the file;
/// user bookmarks are created in the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookmarkSource {
    Native,
    User,
}

/// Named jump target at a page number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub page_number: u32,
    pub title: String,
    pub created_at_ms: u64,
    pub source: BookmarkSource,
}

impl Bookmark {
    /// Key used when reconciling bookmark lists: two bookmarks with the same
    /// page and title are considered the same jump target.
    pub fn dedup_key(&self) -> (u32, &str) {
        (self.page_number, self.title.as_str())
    }
}

/// Immutable summary of an open document. The live `Document` (engine handle,
/// annotations, bookmarks) is owned by the session store; this is the shape
/// handed out to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: DocumentId,
    pub name: String,
    pub byte_size: u64,
    pub page_count: u32,
    /// Set once at load time when the document came from a file on disk.
    pub source_path: Option<PathBuf>,
}

/// UI-facing ordered reference to one document. Tabs never own documents;
/// `document_id` must name a live entry in the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub document_id: DocumentId,
    pub name: String,
    pub is_modified: bool,
    /// Dense display position, unique within the registry.
    pub order: u32,
}

/// One entry in the recently-opened history, keyed by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFileEntry {
    pub path: PathBuf,
    pub name: String,
    pub last_opened_ms: u64,
    pub thumbnail_path: Option<PathBuf>,
}
