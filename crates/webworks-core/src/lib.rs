//! webworks-core - Core traits, types, and lifecycle management
//!
//! This crate provides the foundational types for building WebWorks native
//! extensions:
//! - [`Extension`] trait, the Rust side of the host's `JSExt` object
//! - [`LifecycleState`] for managing extension lifecycle
//! - [`ExtensionError`] for error handling
//! - [`ExtensionConfig`] and [`RecoveryConfig`] for configuration
//! - [`EventEmitter`] for pushing events back to the JavaScript side

mod config;
mod error;
mod events;
mod extension;
mod lifecycle;

pub use config::{ExtensionConfig, ExtensionMetadata, RecoveryConfig};
pub use error::{ExtensionError, ExtensionResult};
pub use events::{EventEmitter, EventSink, NullSink};
pub use extension::{Extension, ExtensionContext};
pub use lifecycle::LifecycleState;

/// Log levels for host callbacks
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl LogLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Off,
        }
    }

    /// Parse a level name as used in configuration (`"debug"`, `"WARN"`, ...)
    ///
    /// Unknown names fall back to `Info`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "off" | "none" => LogLevel::Off,
            _ => LogLevel::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        EventEmitter, EventSink, Extension, ExtensionConfig, ExtensionContext, ExtensionError,
        ExtensionResult, LifecycleState, LogLevel, RecoveryConfig,
    };
}
