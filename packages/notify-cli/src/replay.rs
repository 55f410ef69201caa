//! JSON-lines replay of response events.
//!
//! Each non-blank line is one dispatched event:
//!
//! ```text
//! {"event": "htmx:responseError", "detail": {"xhr": {"status": 404}}, "path": "/clients/7"}
//! {"detail": {"statusCode": 500}}
//! ```
//!
//! `event` defaults to the configured event name. `path` fills the request
//! context so `{path}` message templates have something to show.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use fragment_notify::{PresentError, Presenter, RequestContext, ResponseEvent};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ReplayLine {
    event: Option<String>,
    #[serde(default)]
    detail: Value,
    path: Option<String>,
}

/// Parse one replay line. Returns `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str, default_event: &str) -> Result<Option<ResponseEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let parsed: ReplayLine =
        serde_json::from_str(trimmed).context("replay line is not a JSON object")?;

    let mut request = RequestContext::new();
    if let Some(path) = parsed.path {
        request = request.with_path(path);
    }

    let name = parsed.event.unwrap_or_else(|| default_event.to_string());
    Ok(Some(
        ResponseEvent::new(name, parsed.detail).with_request(request),
    ))
}

/// Wraps a presenter and counts the notifications it accepted.
pub struct CountingPresenter<P> {
    inner: P,
    shown: AtomicUsize,
}

impl<P> CountingPresenter<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            shown: AtomicUsize::new(0),
        }
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::Relaxed)
    }
}

impl<P: Presenter> Presenter for CountingPresenter<P> {
    fn notify(&self, message: &str, blocking: bool) -> Result<(), PresentError> {
        self.inner.notify(message, blocking)?;
        self.shown.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fragment_notify::{NoopPresenter, DEFAULT_STATUS_POINTERS};

    #[test]
    fn test_parse_full_line() {
        let event = parse_line(
            r#"{"event": "custom:error", "detail": {"statusCode": 404}, "path": "/stats"}"#,
            "htmx:responseError",
        )
        .unwrap()
        .unwrap();

        assert_eq!(event.name, "custom:error");
        assert_eq!(event.request.path.as_deref(), Some("/stats"));
        assert_eq!(event.status_code(&DEFAULT_STATUS_POINTERS), Some(404));
    }

    #[test]
    fn test_parse_uses_default_event_name() {
        let event = parse_line(r#"{"detail": {"xhr": {"status": 500}}}"#, "htmx:responseError")
            .unwrap()
            .unwrap();
        assert_eq!(event.name, "htmx:responseError");
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        assert!(parse_line("   ", "e").unwrap().is_none());
        assert!(parse_line("# broken links on /clients", "e").unwrap().is_none());
    }

    #[test]
    fn test_malformed_line_is_error() {
        assert!(parse_line("{not json", "e").is_err());
        assert!(parse_line("[1, 2]", "e").is_err());
    }

    #[test]
    fn test_counting_presenter_counts_successes() {
        let presenter = CountingPresenter::new(NoopPresenter);
        presenter.notify("a", true).unwrap();
        presenter.notify("b", false).unwrap();
        assert_eq!(presenter.shown(), 2);
    }
}
