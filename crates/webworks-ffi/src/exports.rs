//! C ABI exported functions
//!
//! These are the entry points the WebWorks host calls. Every function that
//! runs extension code is wrapped in [`catch_panic`] so a panic never unwinds
//! into the host.

use crate::buffer::FfiBuffer;
use crate::handle::{ExtensionHandle, ExtensionHandleManager};
use crate::panic_guard::catch_panic;
use crate::registry::ExtensionRegistry;
use crate::sink::{FfiEventSink, SendEventCallback};
use std::ffi::{CStr, c_char, c_void};
use std::panic::AssertUnwindSafe;
use std::ptr;
use std::sync::Arc;
use webworks_core::{EventEmitter, EventSink, ExtensionConfig, ExtensionError, LogLevel, NullSink};
use webworks_logging::{LogCallback, LogCallbackManager};

/// Opaque handle type for FFI
pub type FfiExtensionHandle = *mut c_void;

/// List the classes this library can create
///
/// # Returns
/// FfiBuffer with the class names separated by spaces (free with
/// `webworks_free_buffer`)
#[unsafe(no_mangle)]
pub extern "C" fn webworks_get_object_list() -> FfiBuffer {
    FfiBuffer::from_string(ExtensionRegistry::global().object_list())
}

/// Create and start an extension object
///
/// # Parameters
/// - `class_name`: Registered class name (null-terminated)
/// - `object_id`: Id the host uses to route events back (null-terminated)
/// - `config_json`: JSON configuration bytes (can be null for defaults)
/// - `config_len`: Length of config_json
/// - `send_event`: Callback receiving `"<objectId> <event> <payload>"` strings
/// - `event_context`: Opaque pointer passed back to `send_event`
/// - `log_callback`: Optional log callback function
///
/// # Returns
/// Handle to the started object, or null on failure
///
/// # Safety
/// - `class_name` and `object_id` must be valid null-terminated C strings
/// - `config_json` must be valid for `config_len` bytes if not null
/// - `send_event`, `event_context` and the log callback must remain valid
///   until the object is destroyed
#[unsafe(no_mangle)]
pub unsafe extern "C" fn webworks_create_object(
    class_name: *const c_char,
    object_id: *const c_char,
    config_json: *const u8,
    config_len: usize,
    send_event: Option<SendEventCallback>,
    event_context: *mut c_void,
    log_callback: Option<LogCallback>,
) -> FfiExtensionHandle {
    catch_panic(
        0,
        AssertUnwindSafe(|| unsafe {
            create_object_impl(
                class_name,
                object_id,
                config_json,
                config_len,
                send_event,
                event_context,
                log_callback,
            )
        }),
    )
    .unwrap_or_else(|mut error_buffer| {
        // SAFETY: the buffer was produced by catch_panic and is freed once.
        unsafe { error_buffer.free() };
        ptr::null_mut()
    })
}

unsafe fn create_object_impl(
    class_name: *const c_char,
    object_id: *const c_char,
    config_json: *const u8,
    config_len: usize,
    send_event: Option<SendEventCallback>,
    event_context: *mut c_void,
    log_callback: Option<LogCallback>,
) -> FfiExtensionHandle {
    if let Some(cb) = log_callback {
        LogCallbackManager::global().set_callback(Some(cb));
    }
    webworks_logging::init_logging();
    crate::panic_guard::install_panic_hook();

    // SAFETY: caller guarantees both are valid C strings when not null
    let Some(class_name) = (unsafe { c_str(class_name) }) else {
        tracing::error!("class name is null or not UTF-8");
        return ptr::null_mut();
    };
    let Some(object_id) = (unsafe { c_str(object_id) }) else {
        tracing::error!(class = class_name, "object id is null or not UTF-8");
        return ptr::null_mut();
    };

    let config = if config_json.is_null() || config_len == 0 {
        ExtensionConfig::default()
    } else {
        // SAFETY: caller guarantees config_json is valid for config_len bytes
        let config_slice = unsafe { std::slice::from_raw_parts(config_json, config_len) };
        match ExtensionConfig::from_json(config_slice) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(class = class_name, "failed to parse config: {}", e);
                return ptr::null_mut();
            }
        }
    };

    if !config.log_level.is_empty() {
        webworks_logging::set_log_level(LogLevel::from_name(&config.log_level));
    }

    create_started(class_name, object_id, config, send_event, event_context)
}

fn create_started(
    class_name: &str,
    object_id: &str,
    config: ExtensionConfig,
    send_event: Option<SendEventCallback>,
    event_context: *mut c_void,
) -> FfiExtensionHandle {
    let extension = match ExtensionRegistry::global().create(class_name) {
        Ok(extension) => extension,
        Err(e) => {
            tracing::error!("{}", e);
            return ptr::null_mut();
        }
    };

    let sink: Arc<dyn EventSink> = match send_event {
        Some(callback) => Arc::new(FfiEventSink::new(callback, event_context)),
        None => Arc::new(NullSink),
    };
    let events = EventEmitter::new(object_id, sink);

    let handle = match ExtensionHandle::new(class_name, extension, config, events) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(class = class_name, "failed to create handle: {}", e);
            return ptr::null_mut();
        }
    };

    if let Err(e) = handle.start() {
        tracing::error!(class = class_name, "failed to start extension: {}", e);
        if let Err(e) = handle.release_failed_start() {
            tracing::warn!(class = class_name, "cleanup after failed start: {}", e);
        }
        return ptr::null_mut();
    }

    ExtensionHandleManager::global().register(handle) as FfiExtensionHandle
}

/// Run one invocation string against an object
///
/// # Parameters
/// - `handle`: Handle from webworks_create_object
/// - `command`: `"<command> <args>"`, null-terminated
///
/// # Returns
/// FfiBuffer with the result string; on failure `error_code` is set and the
/// data holds the error message. Free with `webworks_free_buffer`.
///
/// # Safety
/// - `handle` must be a valid handle from webworks_create_object
/// - `command` must be a valid null-terminated C string
#[unsafe(no_mangle)]
pub unsafe extern "C" fn webworks_invoke(
    handle: FfiExtensionHandle,
    command: *const c_char,
) -> FfiBuffer {
    let handle_id = handle as u64;
    match catch_panic(
        handle_id,
        AssertUnwindSafe(|| unsafe { invoke_impl(handle, command) }),
    ) {
        Ok(result) => result,
        Err(error_buffer) => error_buffer,
    }
}

unsafe fn invoke_impl(handle: FfiExtensionHandle, command: *const c_char) -> FfiBuffer {
    let Some(extension) = ExtensionHandleManager::global().get(handle as u64) else {
        return FfiBuffer::error(
            ExtensionError::FfiError("invalid handle".to_string()).error_code(),
            "Invalid handle",
        );
    };

    // SAFETY: caller guarantees command is a valid C string when not null
    let Some(raw) = (unsafe { c_str(command) }) else {
        return FfiBuffer::error(
            ExtensionError::InvalidArguments(String::new()).error_code(),
            "Command is null or not UTF-8",
        );
    };

    match extension.invoke(raw) {
        Ok(result) => FfiBuffer::from_string(result),
        Err(e) => FfiBuffer::error(e.error_code(), &e.to_string()),
    }
}

/// Whether the host may destroy the object now
///
/// Unknown handles report `true` so the host can clean up its side.
///
/// # Safety
/// - `handle` must be a handle from webworks_create_object
#[unsafe(no_mangle)]
pub unsafe extern "C" fn webworks_can_delete(handle: FfiExtensionHandle) -> bool {
    let handle_id = handle as u64;
    catch_panic(
        handle_id,
        AssertUnwindSafe(|| {
            ExtensionHandleManager::global()
                .get(handle_id)
                .is_none_or(|h| h.can_delete())
        }),
    )
    .unwrap_or(true)
}

/// Stop and release an object
///
/// # Returns
/// true on success, false on failure or unknown handle
///
/// # Safety
/// - `handle` must be a valid handle from webworks_create_object
/// - After this call, the handle is no longer valid
#[unsafe(no_mangle)]
pub unsafe extern "C" fn webworks_destroy_object(handle: FfiExtensionHandle) -> bool {
    let handle_id = handle as u64;
    catch_panic(handle_id, AssertUnwindSafe(|| destroy_object_impl(handle_id))).unwrap_or_default()
}

fn destroy_object_impl(handle_id: u64) -> bool {
    let Some(extension) = ExtensionHandleManager::global().remove(handle_id) else {
        return false;
    };

    match extension.shutdown() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(class = extension.class_name(), "destroy error: {}", e);
            false
        }
    }
}

/// Free a buffer returned by this library
///
/// # Safety
/// - `buffer` must point to an FfiBuffer returned by this library
/// - Must only be called once per buffer
#[unsafe(no_mangle)]
pub unsafe extern "C" fn webworks_free_buffer(buffer: *mut FfiBuffer) {
    unsafe {
        if !buffer.is_null() {
            (*buffer).free();
        }
    }
}

/// Set the process-wide log level
///
/// # Parameters
/// - `level`: 0=Trace, 1=Debug, 2=Info, 3=Warn, 4=Error, 5=Off
#[unsafe(no_mangle)]
pub extern "C" fn webworks_set_log_level(level: u8) {
    webworks_logging::set_log_level(LogLevel::from_u8(level));
}

/// Get the lifecycle state of an object
///
/// # Returns
/// State code (0=Installed, 1=Starting, 2=Active, 3=Stopping, 4=Stopped, 5=Failed),
/// or 255 if the handle is unknown
///
/// # Safety
/// - `handle` must be a handle from webworks_create_object
#[unsafe(no_mangle)]
pub unsafe extern "C" fn webworks_get_state(handle: FfiExtensionHandle) -> u8 {
    ExtensionHandleManager::global()
        .get(handle as u64)
        .map_or(255, |h| h.state() as u8)
}

/// Borrow a C string as UTF-8
///
/// # Safety
/// `ptr` must be null or a valid null-terminated string outliving `'a`.
unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}
