//! # fragment-notify
//!
//! Surfaces failed fragment-swap requests to the user.
//!
//! A page-fragment library (htmx) dispatches a response event on the
//! document whenever an asynchronous fetch comes back with an error status.
//! The [`ErrorNotifier`] listens for that event and, when the status is the
//! configured one (404 by default), asks a [`Presenter`] to show a message.
//!
//! ## Architecture
//!
//! ```text
//! async host ──► ResponseBus ──forward_to()──┐
//!                                            ▼
//! fragment-swap library ──dispatch()──► Document ──► other listeners
//!                                            │
//!                                            ▼
//!                                     ErrorNotifier
//!                                            │ status == target
//!                                            ▼
//!                               Presenter.notify(message, blocking)
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Stateless** - The notifier keeps nothing from an event after handling it
//! 2. **Never stops propagation** - Every other listener still sees the event
//! 3. **Never faults the host** - Malformed payloads are ignored, presenter failures logged
//! 4. **No deduplication** - N matching events produce N notifications
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fragment_notify::{Document, ErrorNotifier, NotifierConfig, TerminalPresenter};
//!
//! let document = Document::new();
//! ErrorNotifier::initialize(
//!     &document,
//!     NotifierConfig::default(),
//!     Arc::new(TerminalPresenter::stdout()),
//! )?;
//!
//! document.dispatch(&ResponseEvent::new(
//!     "htmx:responseError",
//!     serde_json::json!({ "xhr": { "status": 404 } }),
//! ));
//! ```

mod bus;
mod config;
mod error;
mod event;
mod notifier;
mod presenter;
mod source;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::bus::ResponseBus;
pub use crate::config::{
    NotifierConfig, DEFAULT_EVENT_NAME, DEFAULT_MESSAGE, DEFAULT_STATUS_POINTERS,
    DEFAULT_TARGET_STATUS,
};
pub use crate::error::{NotifyError, PresentError};
pub use crate::event::{CorrelationId, RequestContext, ResponseEvent};
pub use crate::notifier::{ErrorNotifier, HandleOutcome, IgnoreReason};
pub use crate::presenter::{
    ChannelPresenter, NoopPresenter, Notification, Presentation, Presenter, TerminalPresenter,
};
pub use crate::source::{Document, EventSource, Listener};
