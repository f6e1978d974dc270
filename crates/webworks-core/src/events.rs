//! Event delivery back to the JavaScript side

use std::fmt;
use std::sync::Arc;

/// Destination for encoded plugin events
///
/// The host ABI delivers events as a single string of the form
/// `"<objectId> <eventName> <payload>"`. Implementations must be cheap and
/// non-blocking: events are emitted from service callbacks and background
/// tasks.
pub trait EventSink: Send + Sync {
    /// Deliver one fully encoded event string
    fn send(&self, event: &str);
}

/// Sink that drops every event, used before the host registers a callback
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn send(&self, _event: &str) {}
}

/// Emits events on behalf of one extension object
///
/// Prefixes every event with the object id the host assigned at creation,
/// which is how the JavaScript side routes the event to its wrapper.
#[derive(Clone)]
pub struct EventEmitter {
    object_id: Arc<str>,
    sink: Arc<dyn EventSink>,
}

impl EventEmitter {
    /// Create an emitter for the given object id
    pub fn new(object_id: impl Into<Arc<str>>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            object_id: object_id.into(),
            sink,
        }
    }

    /// Emitter that discards everything
    pub fn detached(object_id: impl Into<Arc<str>>) -> Self {
        Self::new(object_id, Arc::new(NullSink))
    }

    /// The host-assigned object id
    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Send an event body (`"<eventName> <payload>"`)
    pub fn notify(&self, event: impl fmt::Display) {
        let encoded = format!("{} {}", self.object_id, event);
        self.sink.send(&encoded);
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("object_id", &self.object_id)
            .finish_non_exhaustive()
    }
}
