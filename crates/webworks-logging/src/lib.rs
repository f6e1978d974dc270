//! webworks-logging - Tracing to host log callback bridge
//!
//! This crate provides:
//! - [`HostLoggingLayer`] tracing layer that forwards events to the host
//! - [`LogCallback`] type for the host log callback function
//! - Dynamic log level filtering through [`ReloadHandle`]

mod callback;
mod layer;
mod reload;

pub use callback::{LogCallback, LogCallbackManager};
pub use layer::{HostLoggingLayer, init_logging, init_logging_with_level};
pub use reload::ReloadHandle;
pub use webworks_core::LogLevel;

/// Set the level used by both the callback manager and the subscriber filter
pub fn set_log_level(level: LogLevel) {
    LogCallbackManager::global().set_level(level);
    // Not installed yet is fine, the manager still filters.
    let _ = ReloadHandle::global().reload_level(level);
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        HostLoggingLayer, LogCallback, LogCallbackManager, LogLevel, init_logging, set_log_level,
    };
}
