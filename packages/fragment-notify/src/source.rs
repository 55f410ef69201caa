//! Document-level event source.
//!
//! The [`Document`] is the process-wide place response events are dispatched
//! on. Listeners register against an event name and are invoked
//! synchronously, on the dispatching thread, in registration order.
//!
//! # Guarantees
//!
//! - **Every listener runs**: there is no stop-propagation primitive
//! - **Snapshot dispatch**: listeners registered during a dispatch see the next event
//! - **Panic isolation**: a panicking listener is logged and skipped
//!
//! # Example
//!
//! ```ignore
//! let document = Document::new();
//!
//! document.add_listener("htmx:responseError", Arc::new(|event| {
//!     tracing::info!(name = %event.name, "saw response error");
//! }));
//!
//! let invoked = document.dispatch(&ResponseEvent::new("htmx:responseError", json!({})));
//! assert_eq!(invoked, 1);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{error, trace};

use crate::event::ResponseEvent;

/// Callback invoked for each dispatched event.
pub type Listener = Arc<dyn Fn(&ResponseEvent) + Send + Sync>;

/// Something response events can be subscribed to.
pub trait EventSource: Send + Sync {
    /// Register a listener for `event_name`.
    ///
    /// Registrations live as long as the source. There is no removal.
    fn add_listener(&self, event_name: &str, listener: Listener);

    /// Register a listener unless one with the same `key` already listens on
    /// `event_name`. Returns `false` when the key is taken.
    fn add_keyed_listener(&self, event_name: &str, key: &'static str, listener: Listener) -> bool;
}

struct Registration {
    key: Option<&'static str>,
    listener: Listener,
}

#[derive(Default)]
struct DocumentInner {
    listeners: DashMap<String, Vec<Registration>>,
}

/// Process-wide synchronous event source.
///
/// Cloning shares the same listener registry.
#[derive(Clone, Default)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch an event to every listener registered for its name.
    ///
    /// Returns the number of listeners invoked, including ones that panicked.
    pub fn dispatch(&self, event: &ResponseEvent) -> usize {
        // Clone the listeners out so no shard lock is held while they run.
        let snapshot: Vec<Listener> = match self.inner.listeners.get(&event.name) {
            Some(registrations) => registrations
                .iter()
                .map(|registration| registration.listener.clone())
                .collect(),
            None => return 0,
        };

        trace!(
            event = %event.name,
            cid = %event.request.correlation_id,
            listeners = snapshot.len(),
            "dispatching response event"
        );

        for listener in &snapshot {
            if let Err(panic_info) = panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                let panic_msg = extract_panic_message(&panic_info);
                error!(event = %event.name, panic = %panic_msg, "listener panicked");
            }
        }

        snapshot.len()
    }

    /// Number of listeners registered for `event_name`.
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.inner
            .listeners
            .get(event_name)
            .map_or(0, |registrations| registrations.len())
    }
}

impl EventSource for Document {
    fn add_listener(&self, event_name: &str, listener: Listener) {
        self.inner
            .listeners
            .entry(event_name.to_string())
            .or_default()
            .push(Registration {
                key: None,
                listener,
            });
    }

    fn add_keyed_listener(&self, event_name: &str, key: &'static str, listener: Listener) -> bool {
        // The entry guard holds the shard lock, so check-and-insert is atomic.
        let mut registrations = self
            .inner
            .listeners
            .entry(event_name.to_string())
            .or_default();

        if registrations
            .iter()
            .any(|registration| registration.key == Some(key))
        {
            return false;
        }

        registrations.push(Registration {
            key: Some(key),
            listener,
        });
        true
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("event_names", &self.inner.listeners.len())
            .finish_non_exhaustive()
    }
}

fn extract_panic_message(panic_info: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
