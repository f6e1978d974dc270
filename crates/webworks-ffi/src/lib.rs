//! webworks-ffi - C ABI exports for WebWorks native extensions
//!
//! This crate provides the boundary the WebWorks host loads:
//! - [`ExtensionRegistry`] mapping JavaScript class names to factories
//! - [`ExtensionHandle`] owning one live extension object and its runtime
//! - [`FfiBuffer`] for returning invocation results
//! - C ABI exported functions (see below)
//!
//! # FFI Functions
//!
//! - `webworks_register` - Register classes (generated by [`extension_entry!`])
//! - `webworks_get_object_list` - Space separated class names
//! - `webworks_create_object` - Create and start an object for a class
//! - `webworks_invoke` - Run a `"<command> <args>"` string
//! - `webworks_can_delete` - Whether the host may destroy the object now
//! - `webworks_destroy_object` - Stop and release an object
//! - `webworks_free_buffer` - Free a buffer returned by `webworks_invoke`
//! - `webworks_set_log_level` - Change the process-wide log level
//! - `webworks_get_state` - Lifecycle state of an object

mod buffer;
mod exports;
mod handle;
mod panic_guard;
mod registry;
mod sink;

pub use buffer::FfiBuffer;
pub use handle::{ExtensionHandle, ExtensionHandleManager};
pub use registry::{ExtensionFactory, ExtensionRegistry};
pub use sink::{FfiEventSink, SendEventCallback};

pub use exports::{
    FfiExtensionHandle, webworks_can_delete, webworks_create_object, webworks_destroy_object,
    webworks_free_buffer, webworks_get_object_list, webworks_get_state, webworks_invoke,
    webworks_set_log_level,
};

// Re-export types needed for extension implementation
pub use webworks_core::{
    EventEmitter, Extension, ExtensionConfig, ExtensionContext, ExtensionError, LogLevel,
};
pub use webworks_logging::LogCallback;
pub use webworks_runtime::{AsyncBridge, AsyncRuntime, RuntimeConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ExtensionHandle, ExtensionHandleManager, ExtensionRegistry, FfiBuffer};
    pub use webworks_core::prelude::*;
    pub use webworks_logging::prelude::*;
    pub use webworks_runtime::prelude::*;
    pub use webworks_transport::prelude::*;
}

/// Generate the `webworks_register` entry point for an extension library
///
/// Each entry maps the class name JavaScript asks for to a constructor.
/// The generated function returns the number of registered classes.
///
/// # Example
///
/// ```ignore
/// webworks_ffi::extension_entry! {
///     "Toast" => Toast::default,
/// }
/// ```
#[macro_export]
macro_rules! extension_entry {
    ($($class:literal => $factory:expr_2021),+ $(,)?) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn webworks_register() -> u32 {
            let registry = $crate::ExtensionRegistry::global();
            $(
                registry.register($class, || {
                    Box::new(($factory)()) as Box<dyn $crate::Extension>
                });
            )+
            registry.len() as u32
        }
    };
}
