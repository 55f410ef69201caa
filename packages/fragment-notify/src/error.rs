//! Structured error types for fragment-notify.
//!
//! # The Error Boundary Rule
//!
//! > **No error ever escapes event handling.**
//!
//! - [`NotifyError`] is returned from setup paths only (`initialize`, config loading)
//! - [`PresentError`] is produced by presenters and always swallowed by the notifier
//!
//! A notification that fails to render degrades to a `warn` log line. The
//! host page keeps running.

use std::io;

use thiserror::Error;

/// Errors returned while wiring the notifier into a host.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// A notifier is already listening for this event on the source.
    #[error("notifier already initialized for event `{event_name}`")]
    AlreadyInitialized {
        /// Event name the existing registration listens on.
        event_name: String,
    },

    /// Configuration could not be used.
    #[error("invalid notifier config: {reason}")]
    InvalidConfig {
        /// What was wrong with it.
        reason: String,
    },
}

impl NotifyError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Errors a [`Presenter`](crate::Presenter) may report.
#[derive(Debug, Error)]
pub enum PresentError {
    /// The display mechanism is gone (UI closed, channel dropped, ...).
    #[error("presentation unavailable: {0}")]
    Unavailable(String),

    /// Writing the notification failed.
    #[error("failed to write notification: {0}")]
    Io(#[from] io::Error),
}
