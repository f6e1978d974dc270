//! webworks-runtime - Tokio runtime integration
//!
//! This crate provides:
//! - [`AsyncRuntime`] owning the Tokio runtime of one extension object
//! - [`AsyncBridge`] for running async handlers from synchronous ABI calls
//! - [`ShutdownHandle`] / [`ShutdownSignal`] for cooperative teardown of
//!   long-running tasks such as connection monitors

mod bridge;
mod runtime;
mod shutdown;

pub use bridge::AsyncBridge;
pub use runtime::{AsyncRuntime, RuntimeConfig};
pub use shutdown::{ShutdownHandle, ShutdownSignal};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{AsyncBridge, AsyncRuntime, RuntimeConfig, ShutdownHandle, ShutdownSignal};
}
