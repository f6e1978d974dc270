//! Dynamic log level reloading support

use crate::layer::level_to_filter;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::reload;
use webworks_core::LogLevel;

type FilterHandle = reload::Handle<LevelFilter, tracing_subscriber::Registry>;

/// Handle for dynamically reloading the log level filter
pub struct ReloadHandle {
    handle: Mutex<Option<FilterHandle>>,
}

impl ReloadHandle {
    /// Create a new reload handle
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Get the global reload handle
    pub fn global() -> &'static ReloadHandle {
        static INSTANCE: OnceCell<ReloadHandle> = OnceCell::new();
        INSTANCE.get_or_init(ReloadHandle::new)
    }

    /// Set the reload handle (called during initialization)
    pub fn set_handle(&self, handle: FilterHandle) {
        *self.handle.lock() = Some(handle);
    }

    /// Whether a subscriber filter has been installed
    pub fn is_installed(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Reload the filter to use a new log level
    pub fn reload_level(&self, level: LogLevel) -> Result<(), String> {
        let guard = self.handle.lock();
        let handle = guard
            .as_ref()
            .ok_or_else(|| "Reload handle not initialized".to_string())?;
        handle
            .reload(level_to_filter(level))
            .map_err(|e| format!("Failed to reload filter: {}", e))
    }
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}
