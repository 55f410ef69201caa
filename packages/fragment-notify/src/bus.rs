//! Broadcast bus for hosts that receive response events off the dispatch thread.
//!
//! # Guarantees
//!
//! - **At-most-once delivery**: Slow receivers may miss events
//! - **In-memory only**: Events are not persisted
//! - **No replay**: Lagged receivers skip ahead with a warning
//!
//! [`ResponseBus::forward_to`] bridges the bus onto a [`Document`], so events
//! emitted from async code reach the same synchronous listeners (the error
//! notifier included) as events dispatched directly.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::event::ResponseEvent;
use crate::source::Document;

/// Default channel capacity for the response bus.
const DEFAULT_CAPACITY: usize = 1024;

/// Broadcast channel of [`ResponseEvent`]s.
///
/// # Example
///
/// ```ignore
/// let bus = ResponseBus::new();
/// let document = Document::new();
/// ErrorNotifier::initialize(&document, NotifierConfig::default(), presenter)?;
///
/// bus.forward_to(document);
/// bus.emit(ResponseEvent::new("htmx:responseError", json!({ "statusCode": 404 })));
/// ```
#[derive(Clone)]
pub struct ResponseBus {
    sender: broadcast::Sender<ResponseEvent>,
}

impl ResponseBus {
    /// Create a new bus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new bus with the specified capacity.
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start lagging.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers (fire-and-forget).
    ///
    /// Returns the number of receivers that received the event.
    pub fn emit(&self, event: ResponseEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ResponseEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Spawn a task that dispatches every bus event onto `document`.
    ///
    /// Must be called from within a tokio runtime. The task ends once every
    /// sender clone of this bus has been dropped.
    pub fn forward_to(&self, document: Document) -> JoinHandle<()> {
        let mut receiver = self.subscribe();

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        document.dispatch(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "response bus forwarder lagged, events dropped");
                    }
                    Err(RecvError::Closed) => {
                        debug!("response bus closed, forwarder stopping");
                        break;
                    }
                }
            }
        })
    }
}

impl Default for ResponseBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResponseBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
