//! webworks-push - Push service extension
//!
//! Exposes the platform push service to JavaScript as the `Push` class:
//! - [`PushExtension`] handles `startService`, channel and launch
//!   registration commands and reports completions as events
//! - [`PushService`], [`PushListener`] and [`PushConnector`] are the seam to
//!   the platform push library
//! - a dropped service connection is recovered with
//!   [`webworks_recovery::ConnectionMonitor`]
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use webworks_core::Extension;
//! use webworks_ffi::ExtensionRegistry;
//!
//! webworks_push::register_class(ExtensionRegistry::global(), Arc::new(PlatformConnector));
//! ```
//!
//! # Building the plugin library
//!
//! This crate is an `rlib`. The shared object the WebWorks host loads comes
//! from a platform glue crate with `crate-type = ["cdylib"]` that depends on
//! `webworks-ffi` and `webworks-push`, supplies the [`PushConnector`] backed
//! by the device push library, and emits the `webworks_register` entry point:
//!
//! ```ignore
//! webworks_ffi::extension_entry! {
//!     "Push" => || webworks_push::PushExtension::new(Arc::new(PlatformConnector)),
//! }
//! ```

mod error;
mod extension;
mod link;
mod payload;
mod service;
mod session;
mod status;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use webworks_core::Extension;
use webworks_ffi::ExtensionRegistry;

pub use error::{PushError, PushResult};
pub use extension::{PUSH_CLASS, PushExtension};
pub use payload::{PayloadReport, PushPayload, decode_invoke_data};
pub use service::{PushConnector, PushListener, PushService, StartOptions};
pub use status::{PushCommand, PushStatus};

/// Register the `Push` class, creating objects that connect through `connector`
pub fn register_class(registry: &ExtensionRegistry, connector: Arc<dyn PushConnector>) {
    registry.register(PUSH_CLASS, move || {
        Box::new(PushExtension::new(connector.clone())) as Box<dyn Extension>
    });
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        PushCommand, PushConnector, PushError, PushExtension, PushListener, PushPayload,
        PushResult, PushService, PushStatus, StartOptions,
    };
}
