//! Host log callback management

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use webworks_core::LogLevel;
use std::sync::atomic::{AtomicU8, Ordering};

/// Host callback function type for logging
///
/// # Parameters
/// - `level`: Log level (0=Trace, 1=Debug, 2=Info, 3=Warn, 4=Error)
/// - `target`: Log target (module path), null-terminated C string
/// - `message`: Log message, pointer to UTF-8 bytes
/// - `message_len`: Length of the message in bytes
///
/// # Safety
/// The callback may be invoked from any runtime worker thread. `target` is
/// null-terminated and `message` is only valid for the duration of the call.
pub type LogCallback = extern "C" fn(
    level: u8,
    target: *const std::ffi::c_char,
    message: *const u8,
    message_len: usize,
);

/// Global log callback manager
static CALLBACK_MANAGER: OnceCell<LogCallbackManager> = OnceCell::new();

/// Process-wide log callback and level
///
/// The host registers one callback for all extension objects, so this is a
/// singleton rather than per-object state.
pub struct LogCallbackManager {
    callback: RwLock<Option<LogCallback>>,
    level: AtomicU8,
}

impl LogCallbackManager {
    /// Create a new callback manager
    pub fn new() -> Self {
        Self {
            callback: RwLock::new(None),
            level: AtomicU8::new(LogLevel::Info as u8),
        }
    }

    /// Get the global callback manager instance
    pub fn global() -> &'static LogCallbackManager {
        CALLBACK_MANAGER.get_or_init(LogCallbackManager::new)
    }

    /// Set the log callback
    pub fn set_callback(&self, callback: Option<LogCallback>) {
        let mut guard = self.callback.write();
        *guard = callback;
    }

    /// Get the current log callback
    pub fn get_callback(&self) -> Option<LogCallback> {
        *self.callback.read()
    }

    /// Set the log level
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::SeqCst);
    }

    /// Get the current log level
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::SeqCst))
    }

    /// Check if a log level is enabled
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    /// Check whether a host callback is registered
    pub fn has_callback(&self) -> bool {
        self.callback.read().is_some()
    }

    /// Invoke the callback if set and level is enabled
    pub fn log(&self, level: LogLevel, target: &str, message: &str) {
        if level == LogLevel::Off || !self.is_enabled(level) {
            return;
        }

        let Some(callback) = self.get_callback() else {
            return;
        };

        // Module paths never contain NUL; skip rather than truncate if one does.
        let Ok(target_cstring) = std::ffi::CString::new(target) else {
            return;
        };

        callback(
            level as u8,
            target_cstring.as_ptr(),
            message.as_ptr(),
            message.len(),
        );
    }
}

impl Default for LogCallbackManager {
    fn default() -> Self {
        Self::new()
    }
}

// Function pointers are plain code addresses; the host guarantees thread safety.
unsafe impl Send for LogCallbackManager {}
unsafe impl Sync for LogCallbackManager {}
