//! The error notifier.
//!
//! Listens for response events on a document, and when one carries the
//! configured status (404 by default) asks the presenter to show the
//! configured message.
//!
//! ```text
//! fragment-swap library
//!     │
//!     ▼ dispatch("htmx:responseError")
//! Document ───────────────┬──────────────► other listeners
//!     │                   │
//!     ▼                   │
//! ErrorNotifier.handle()  │  (never stops propagation)
//!     │
//!     ├─ status != target ─► ignored
//!     │
//!     └─ status == target ─► Presenter.notify(message, blocking)
//!                                 │
//!                                 └─ Err ─► warn!, swallowed
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::NotifierConfig;
use crate::error::NotifyError;
use crate::event::ResponseEvent;
use crate::presenter::Presenter;
use crate::source::EventSource;

/// Registration key that keeps a source to one notifier per event name.
const LISTENER_KEY: &str = "fragment-notify::error-notifier";

/// Why an event did not produce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The payload had no readable integer status.
    MissingStatus,
    /// The status was readable but not the target.
    StatusMismatch(u16),
}

/// What handling one event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The presenter accepted the notification.
    Notified { message: String },
    /// Nothing to do for this event.
    Ignored(IgnoreReason),
    /// The presenter failed. Already logged.
    PresentationFailed,
}

impl HandleOutcome {
    pub fn is_notified(&self) -> bool {
        matches!(self, HandleOutcome::Notified { .. })
    }
}

/// Stateless filter-and-act handler for response events.
pub struct ErrorNotifier {
    config: NotifierConfig,
    presenter: Arc<dyn Presenter>,
}

impl ErrorNotifier {
    /// Build a notifier without registering it anywhere.
    pub fn new(config: NotifierConfig, presenter: Arc<dyn Presenter>) -> Result<Self, NotifyError> {
        config.validate()?;
        Ok(Self { config, presenter })
    }

    /// Subscribe a notifier to `source`, once.
    ///
    /// A second call against the same source and event name fails with
    /// [`NotifyError::AlreadyInitialized`] and leaves the first in place.
    /// The registration lasts as long as the source does.
    pub fn initialize<S: EventSource + ?Sized>(
        source: &S,
        config: NotifierConfig,
        presenter: Arc<dyn Presenter>,
    ) -> Result<(), NotifyError> {
        let notifier = Arc::new(Self::new(config, presenter)?);
        let event_name = notifier.config.event_name.clone();

        let listener_notifier = notifier.clone();
        let registered = source.add_keyed_listener(
            &event_name,
            LISTENER_KEY,
            Arc::new(move |event: &ResponseEvent| {
                listener_notifier.handle(event);
            }),
        );
        if !registered {
            return Err(NotifyError::AlreadyInitialized { event_name });
        }

        info!(
            event = %event_name,
            target_status = notifier.config.target_status,
            blocking = notifier.config.blocking,
            "error notifier listening"
        );
        Ok(())
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Apply the matching policy to one event.
    ///
    /// Never fails. The event is only borrowed for the duration of the call.
    pub fn handle(&self, event: &ResponseEvent) -> HandleOutcome {
        let Some(status) = event.status_code(self.config.status_pointers.as_slice()) else {
            debug!(event = %event.name, "response event without status, ignoring");
            return HandleOutcome::Ignored(IgnoreReason::MissingStatus);
        };

        if status != self.config.target_status {
            debug!(event = %event.name, status, "status not targeted, ignoring");
            return HandleOutcome::Ignored(IgnoreReason::StatusMismatch(status));
        }

        let message = self.render_message(status, event);

        match self.presenter.notify(&message, self.config.blocking) {
            Ok(()) => {
                debug!(
                    cid = %event.request.correlation_id,
                    status,
                    blocking = self.config.blocking,
                    "notification presented"
                );
                HandleOutcome::Notified { message }
            }
            Err(e) => {
                warn!(
                    cid = %event.request.correlation_id,
                    status,
                    error = %e,
                    "failed to present notification"
                );
                HandleOutcome::PresentationFailed
            }
        }
    }

    fn render_message(&self, status: u16, event: &ResponseEvent) -> String {
        let template = &self.config.message;
        if !template.contains('{') {
            return template.clone();
        }
        template
            .replace("{status}", &status.to_string())
            .replace("{path}", event.request.path.as_deref().unwrap_or(""))
    }
}

impl std::fmt::Debug for ErrorNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorNotifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
