//! Panic handling for FFI boundaries
//!
//! A panic must never unwind into the host. Every export runs its body
//! through [`catch_panic`], which turns the panic into an error buffer and
//! marks the object that panicked as failed.

use crate::buffer::FfiBuffer;
use crate::handle::ExtensionHandleManager;
use std::any::Any;
use std::panic;
use std::sync::Once;
use webworks_core::ExtensionError;

/// Run `f`, converting a panic into an error buffer
///
/// `handle_id` is the object being called, or 0 when there is none yet.
/// A panicking object is moved to `Failed` and rejects further commands.
pub fn catch_panic<F, R>(handle_id: u64, f: F) -> Result<R, FfiBuffer>
where
    F: FnOnce() -> R + panic::UnwindSafe,
{
    panic::catch_unwind(f).map_err(|payload| {
        let message = panic_to_string(&payload);
        tracing::error!(handle_id, "panic caught at the host boundary: {}", message);

        if handle_id != 0
            && let Some(h) = ExtensionHandleManager::global().get(handle_id)
        {
            h.mark_failed();
        }

        let code = ExtensionError::Internal(String::new()).error_code();
        FfiBuffer::error(code, &message)
    })
}

fn panic_to_string(payload: &Box<dyn Any + Send>) -> String {
    match payload_str(payload.as_ref()) {
        Some(s) => format!("Extension panicked: {}", s),
        None => "Extension panicked with unknown payload".to_string(),
    }
}

fn payload_str(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

/// Route panic reports through tracing, and so to the host log callback
///
/// Installed once per process; the previous hook is kept and still runs.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();

    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let message = payload_str(info.payload()).unwrap_or("Box<dyn Any>");
            match info.location() {
                Some(location) => tracing::error!(
                    file = location.file(),
                    line = location.line(),
                    "PANIC: {}",
                    message
                ),
                None => tracing::error!("PANIC: {}", message),
            }
            previous(info);
        }));
    });
}
