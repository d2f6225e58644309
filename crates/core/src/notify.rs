//! Notification routing.
//!
//! The engine's non-fatal error paths surface as user-visible notifications.
//! Presentation (toast rendering, the ~3 second auto-dismiss) belongs to the
//! sink implementation; the engine only routes a message and a severity.

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Default sink: forwards notifications to the `tracing` subscriber at the
/// matching level.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => info!(target: "folio::notify", "{message}"),
            Severity::Warning => warn!(target: "folio::notify", "{message}"),
            Severity::Error => error!(target: "folio::notify", "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNotifier;

    #[test]
    fn recording_sink_captures_messages_in_order() {
        let sink = RecordingNotifier::default();
        sink.notify("first", Severity::Info);
        sink.notify("second", Severity::Warning);

        let seen = sink.messages();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("first".to_owned(), Severity::Info));
        assert_eq!(seen[1], ("second".to_owned(), Severity::Warning));
    }

    #[test]
    fn tracing_sink_accepts_all_severities() {
        let sink = TracingNotifier;
        sink.notify("info", Severity::Info);
        sink.notify("warning", Severity::Warning);
        sink.notify("error", Severity::Error);
    }
}
