//! Document load pipeline.
//!
//! Turns raw bytes into a registered document, a bound tab, extracted
//! annotations, and (for file-backed loads) a recent-files entry. The
//! pipeline is all-or-nothing up to the parse: a parse failure registers
//! nothing and only sets the session error flag. Per-page annotation
//! extraction failures degrade that page to zero annotations and keep going.

use crate::cancel::CancellationToken;
use crate::error::{SessionError, SessionResult};
use crate::ids::{now_ms, IdGenerator};
use crate::notify::{NotificationSink, Severity};
use crate::recent::RecentFilesLedger;
use crate::session::{Document, SessionStore};
use crate::tabs::TabRegistry;
use doc_engine::{ParseEngine, ParseEngineError, ParseHandle};
use doc_model::{Annotation, AnnotationRect, Color, DocumentInfo, RecentFileEntry};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, warn};

/// The engine is shared between the loader, the page editor, and the
/// workspace; `parse`/`close` need `&mut`, hence the mutex.
pub(crate) type SharedEngine = Arc<Mutex<Box<dyn ParseEngine>>>;

/// Stages a load passes through. `Errored` is terminal and reachable from
/// `Parsing`; every other transition runs in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Idle,
    Parsing,
    ExtractingContent,
    Registering,
    Ready,
    Errored,
}

impl LoadStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadStage::Ready | LoadStage::Errored)
    }
}

pub struct DocumentLoader {
    engine: SharedEngine,
    ids: Arc<IdGenerator>,
    session: Arc<SessionStore>,
    tabs: Arc<TabRegistry>,
    recent: Arc<RecentFilesLedger>,
    notifier: Arc<dyn NotificationSink>,
}

impl DocumentLoader {
    pub(crate) fn new(
        engine: SharedEngine,
        ids: Arc<IdGenerator>,
        session: Arc<SessionStore>,
        tabs: Arc<TabRegistry>,
        recent: Arc<RecentFilesLedger>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self { engine, ids, session, tabs, recent, notifier }
    }

    /// Runs the full load pipeline and returns the registered document's
    /// summary. The cancellation token is checked between stages; once
    /// registration starts the load runs to completion.
    #[instrument(skip_all, fields(name = %name, byte_size = bytes.len()))]
    pub fn load_document(
        &self,
        bytes: Vec<u8>,
        name: &str,
        source_path: Option<PathBuf>,
        cancel: &CancellationToken,
    ) -> SessionResult<DocumentInfo> {
        self.session.set_loading(true);
        self.session.set_error(None);
        let document_id = self.ids.next("doc");
        let byte_size = bytes.len() as u64;
        debug!(stage = ?LoadStage::Parsing, id = %document_id, "load started");

        // Bind each engine result before matching on it so the mutex guard
        // is dropped at the end of the statement, not held across the arms.
        let parsed = self.engine.lock().unwrap().parse(bytes);
        let handle = match parsed {
            Ok(handle) => handle,
            Err(err) => return Err(self.fail_parse(err)),
        };
        let counted = self.engine.lock().unwrap().page_count(handle);
        let page_count = match counted {
            Ok(count) => count,
            Err(err) => {
                self.release(handle);
                return Err(self.fail_parse(err));
            }
        };

        self.not_cancelled(cancel, handle)?;
        debug!(stage = ?LoadStage::ExtractingContent, page_count, "parsed");

        let mut extracted = Vec::new();
        for page in 0..page_count {
            let result = self.engine.lock().unwrap().annotations(handle, page);
            match result {
                Ok(list) => extracted.extend(list),
                Err(err) => {
                    let message = match err {
                        ParseEngineError::Extraction { message, .. } => message,
                        other => other.to_string(),
                    };
                    let failure = SessionError::AnnotationExtraction { page, message };
                    warn!(error = %failure, "page degraded to zero annotations");
                    self.notifier.notify(&failure.to_string(), Severity::Warning);
                }
            }
        }

        self.not_cancelled(cancel, handle)?;
        debug!(stage = ?LoadStage::Registering, annotations = extracted.len(), "extracted");

        let info = DocumentInfo {
            id: document_id.clone(),
            name: name.to_owned(),
            byte_size,
            page_count,
            source_path: source_path.clone(),
        };
        let mut document = Document::new(info.clone(), handle);
        for raw in extracted {
            let annotation = Annotation {
                id: self.ids.next("ann"),
                page_number: raw.page_index,
                rect: AnnotationRect::new(raw.x, raw.y, raw.width, raw.height),
                content: raw.content,
                color: Color::new(raw.color[0], raw.color[1], raw.color[2], raw.color[3]),
            };
            document.annotations.insert(annotation.id.clone(), annotation);
        }

        self.session.add_document(document);
        self.session.set_current_document(&document_id)?;
        self.tabs.add_tab(&self.ids, &document_id, name);
        if let Some(path) = source_path {
            self.recent.add(RecentFileEntry {
                path,
                name: name.to_owned(),
                last_opened_ms: now_ms(),
                thumbnail_path: None,
            });
        }

        self.session.set_loading(false);
        debug!(stage = ?LoadStage::Ready, id = %document_id, "load complete");
        Ok(info)
    }

    fn fail_parse(&self, err: ParseEngineError) -> SessionError {
        let message = match err {
            ParseEngineError::Parse(message) => message,
            other => other.to_string(),
        };
        let failure = SessionError::ParseFailure { message };
        debug!(stage = ?LoadStage::Errored, error = %failure, "load aborted");
        self.session.set_error(Some(failure.to_string()));
        self.session.set_loading(false);
        failure
    }

    fn not_cancelled(&self, cancel: &CancellationToken, handle: ParseHandle) -> SessionResult<()> {
        if cancel.is_cancelled() {
            debug!("load cancelled before registration");
            self.release(handle);
            self.session.set_loading(false);
            return Err(SessionError::LoadCancelled);
        }
        Ok(())
    }

    fn release(&self, handle: ParseHandle) {
        if let Err(err) = self.engine.lock().unwrap().close(handle) {
            warn!(error = %err, "failed to release engine handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::testing::{FakeParseEngine, RecordingNotifier};
    use storage::MemoryStore;

    struct Fixture {
        loader: DocumentLoader,
        session: Arc<SessionStore>,
        tabs: Arc<TabRegistry>,
        recent: Arc<RecentFilesLedger>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture(engine: FakeParseEngine) -> Fixture {
        let engine: SharedEngine = Arc::new(Mutex::new(Box::new(engine)));
        let ids = Arc::new(IdGenerator::new());
        let session = Arc::new(SessionStore::new());
        let tabs = Arc::new(TabRegistry::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let recent = Arc::new(RecentFilesLedger::new(
            Arc::new(MemoryStore::new()),
            notifier.clone(),
            &SessionConfig::default(),
        ));
        let loader = DocumentLoader::new(
            engine,
            ids,
            session.clone(),
            tabs.clone(),
            recent.clone(),
            notifier.clone(),
        );
        Fixture { loader, session, tabs, recent, notifier }
    }

    #[test]
    fn successful_load_registers_document_tab_and_annotations() {
        let fx = fixture(FakeParseEngine::with_pages(3).annotate_page(0, 2).annotate_page(2, 1));

        let info = fx
            .loader
            .load_document(vec![1, 2, 3], "report.pdf", None, &CancellationToken::new())
            .unwrap();

        assert_eq!(info.page_count, 3);
        assert_eq!(info.byte_size, 3);
        assert_eq!(fx.session.document_count(), 1);
        assert_eq!(fx.session.active_document_id(), Some(info.id.clone()));
        assert_eq!(fx.session.annotations(&info.id).unwrap().len(), 3);

        let tab = fx.tabs.tab_for_document(&info.id).unwrap();
        assert_eq!(tab.name, "report.pdf");
        assert!(!fx.session.is_loading());
        assert!(fx.session.error().is_none());
    }

    #[test]
    fn parse_failure_registers_nothing_and_sets_the_error_flag() {
        let fx = fixture(FakeParseEngine::failing_with("truncated header"));

        let err = fx
            .loader
            .load_document(vec![0], "broken.pdf", None, &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, SessionError::ParseFailure { .. }));
        assert_eq!(fx.session.document_count(), 0);
        assert_eq!(fx.tabs.tab_count(), 0);
        assert!(!fx.session.is_loading());
        let flagged = fx.session.error().expect("error flag should be set");
        assert!(flagged.contains("truncated header"));
    }

    #[test]
    fn page_extraction_failure_degrades_that_page_only() {
        let fx = fixture(
            FakeParseEngine::with_pages(3)
                .annotate_page(0, 2)
                .annotate_page(1, 5)
                .failing_on_page(1),
        );

        let info = fx
            .loader
            .load_document(vec![1], "partial.pdf", None, &CancellationToken::new())
            .unwrap();

        // Page 1's five annotations are gone; page 0's two survive.
        assert_eq!(fx.session.annotations(&info.id).unwrap().len(), 2);
        assert!(fx.session.error().is_none());

        let messages = fx.notifier.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].1, Severity::Warning);
        assert!(messages[0].0.contains("page 1"));
    }

    #[test]
    fn file_backed_load_lands_in_the_recent_ledger() {
        let fx = fixture(FakeParseEngine::with_pages(1));

        fx.loader
            .load_document(
                vec![1],
                "report.pdf",
                Some(PathBuf::from("/tmp/report.pdf")),
                &CancellationToken::new(),
            )
            .unwrap();

        let recents = fx.recent.list();
        assert_eq!(recents.len(), 1);
        assert_eq!(recents[0].path, PathBuf::from("/tmp/report.pdf"));
    }

    #[test]
    fn pasted_bytes_load_skips_the_recent_ledger() {
        let fx = fixture(FakeParseEngine::with_pages(1));

        fx.loader
            .load_document(vec![1], "untitled.pdf", None, &CancellationToken::new())
            .unwrap();

        assert!(fx.recent.is_empty());
    }

    #[test]
    fn cancelled_load_registers_nothing_and_releases_the_handle() {
        let engine = FakeParseEngine::with_pages(4);
        let closed = engine.closed_handles();
        let fx = fixture(engine);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = fx
            .loader
            .load_document(vec![1], "late.pdf", None, &cancel)
            .unwrap_err();

        assert!(matches!(err, SessionError::LoadCancelled));
        assert_eq!(fx.session.document_count(), 0);
        assert_eq!(fx.tabs.tab_count(), 0);
        assert!(!fx.session.is_loading());
        // The cancelled load did not leave the error flag behind.
        assert!(fx.session.error().is_none());
        assert_eq!(closed.lock().unwrap().len(), 1);
    }

    #[test]
    fn consecutive_loads_register_independent_documents() {
        let fx = fixture(FakeParseEngine::with_pages(2));

        let first = fx
            .loader
            .load_document(vec![1], "a.pdf", None, &CancellationToken::new())
            .unwrap();
        let second = fx
            .loader
            .load_document(vec![2], "b.pdf", None, &CancellationToken::new())
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(fx.session.document_count(), 2);
        assert_eq!(fx.tabs.tab_count(), 2);
        // The most recent load is the active document.
        assert_eq!(fx.session.active_document_id(), Some(second.id));
    }

    #[test]
    fn load_stage_terminality() {
        assert!(LoadStage::Ready.is_terminal());
        assert!(LoadStage::Errored.is_terminal());
        assert!(!LoadStage::Idle.is_terminal());
        assert!(!LoadStage::Parsing.is_terminal());
        assert!(!LoadStage::ExtractingContent.is_terminal());
        assert!(!LoadStage::Registering.is_terminal());
    }
}
