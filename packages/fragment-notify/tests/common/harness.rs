use std::sync::{Arc, Mutex};

use fragment_notify::{
    ChannelPresenter, Document, ErrorNotifier, NotifierConfig, Notification, Presentation,
    ResponseEvent,
};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;

/// A document with a notifier already listening on it.
///
/// Notifications go through a `ChannelPresenter`, the same path a UI task
/// would drain.
pub struct Page {
    pub document: Document,
    notifications: Mutex<UnboundedReceiver<Notification>>,
}

impl Page {
    pub fn load() -> Self {
        Self::load_with(NotifierConfig::default())
    }

    pub fn load_with(config: NotifierConfig) -> Self {
        let document = Document::new();
        let (presenter, notifications) = ChannelPresenter::new();
        ErrorNotifier::initialize(&document, config, Arc::new(presenter))
            .expect("notifier should initialize on a fresh document");
        Self {
            document,
            notifications: Mutex::new(notifications),
        }
    }

    /// Fire `htmx:responseError` with the given payload.
    pub fn response_error(&self, detail: Value) {
        self.document
            .dispatch(&ResponseEvent::new("htmx:responseError", detail));
    }

    /// Drain every notification shown since the last call, as `(message, blocking)`.
    pub fn shown(&self) -> Vec<(String, bool)> {
        let mut receiver = self.notifications.lock().unwrap();
        let mut shown = Vec::new();
        while let Ok(notification) = receiver.try_recv() {
            shown.push((
                notification.message,
                notification.presentation == Presentation::Modal,
            ));
        }
        shown
    }
}
