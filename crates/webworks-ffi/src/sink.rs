//! Event sink backed by the host's send-event callback

use std::ffi::{CString, c_char, c_void};
use webworks_core::EventSink;

/// Host callback receiving one encoded event string
///
/// `event` is null-terminated and only valid for the duration of the call;
/// `context` is the opaque pointer the host passed at object creation.
pub type SendEventCallback = extern "C" fn(event: *const c_char, context: *mut c_void);

/// Delivers events through the host callback
pub struct FfiEventSink {
    callback: SendEventCallback,
    context: *mut c_void,
}

impl FfiEventSink {
    pub fn new(callback: SendEventCallback, context: *mut c_void) -> Self {
        Self { callback, context }
    }
}

impl EventSink for FfiEventSink {
    fn send(&self, event: &str) {
        let Ok(encoded) = CString::new(event) else {
            tracing::warn!("dropping event containing an interior NUL");
            return;
        };
        (self.callback)(encoded.as_ptr(), self.context);
    }
}

// SAFETY: the host owns `context` and guarantees the callback may be called
// from any thread for as long as the object exists.
unsafe impl Send for FfiEventSink {}
unsafe impl Sync for FfiEventSink {}
