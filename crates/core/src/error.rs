//! Error model for the session engine.
//!
//! Fatal failures abort their operation and leave the session unchanged apart
//! from the error flag; non-fatal failures (per-page extraction, durable
//! writes) are isolated to their unit of work and routed through the
//! notification sink instead of the return value.

use doc_engine::ParseEngineError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The parsing engine rejected the document bytes. Fatal to a load;
    /// nothing is registered.
    #[error("failed to parse document: {message}")]
    ParseFailure { message: String },

    /// Annotation extraction failed for one page. Page-scoped: the load
    /// continues and the page contributes no annotations.
    #[error("failed to extract annotations on page {page}: {message}")]
    AnnotationExtraction { page: u32, message: String },

    /// A durable write failed. The in-memory mutation stands.
    #[error("failed to persist {what}: {message}")]
    Persistence { what: &'static str, message: String },

    /// The request was rejected before any side effect.
    #[error("{message}")]
    Validation { message: String },

    /// The load's cancellation token fired before registration began.
    #[error("document load was cancelled")]
    LoadCancelled,

    #[error("document not found: {id}")]
    DocumentNotFound { id: String },

    #[error("annotation not found: {id}")]
    AnnotationNotFound { id: String },

    #[error("tab not found: {id}")]
    TabNotFound { id: String },

    #[error("bookmark not found: {id}")]
    BookmarkNotFound { id: String },

    /// A page-edit or bookmark-fetch delegation failed inside the engine.
    #[error("parse engine error: {0}")]
    Engine(#[from] ParseEngineError),
}

pub type SessionResult<T> = Result<T, SessionError>;

impl SessionError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = SessionError::ParseFailure { message: "truncated header".to_owned() };
        assert_eq!(err.to_string(), "failed to parse document: truncated header");

        let err = SessionError::DocumentNotFound { id: "doc-42".to_owned() };
        assert_eq!(err.to_string(), "document not found: doc-42");

        let err = SessionError::Persistence {
            what: "recent files",
            message: "disk full".to_owned(),
        };
        assert!(err.to_string().contains("recent files"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn engine_errors_convert_via_from() {
        let engine_err = ParseEngineError::InvalidHandle(7);
        let err: SessionError = engine_err.into();
        assert!(matches!(err, SessionError::Engine(_)));
    }
}
