//! Testing utilities for code that hosts the notifier.
//!
//! # Feature Flag
//!
//! This module is only available with the `testing` feature:
//!
//! ```toml
//! [dev-dependencies]
//! fragment-notify = { path = "../fragment-notify", features = ["testing"] }
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use fragment_notify::testing::{status_event, RecordingPresenter};
//!
//! let presenter = Arc::new(RecordingPresenter::new());
//! ErrorNotifier::initialize(&document, NotifierConfig::default(), presenter.clone())?;
//!
//! document.dispatch(&status_event(404));
//! assert_eq!(presenter.count(), 1);
//! ```

use std::sync::Mutex;

use serde_json::json;

use crate::config::DEFAULT_EVENT_NAME;
use crate::error::PresentError;
use crate::event::ResponseEvent;
use crate::presenter::Presenter;

/// Presenter that records every call instead of showing anything.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<(String, bool)>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(message, blocking)` pair seen so far, in order.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.calls().into_iter().map(|(message, _)| message).collect()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Presenter for RecordingPresenter {
    fn notify(&self, message: &str, blocking: bool) -> Result<(), PresentError> {
        self.calls
            .lock()
            .unwrap()
            .push((message.to_string(), blocking));
        Ok(())
    }
}

/// Presenter whose display mechanism is always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingPresenter;

impl Presenter for FailingPresenter {
    fn notify(&self, _message: &str, _blocking: bool) -> Result<(), PresentError> {
        Err(PresentError::Unavailable("display disabled".to_string()))
    }
}

/// An htmx-shaped `htmx:responseError` event carrying `status`.
pub fn status_event(status: u16) -> ResponseEvent {
    ResponseEvent::new(DEFAULT_EVENT_NAME, json!({ "xhr": { "status": status } }))
}
