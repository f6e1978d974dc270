//! webworks-recovery - Push connection recovery
//!
//! This crate provides:
//! - [`RetryTimer`] that polls a service with exponential backoff until it
//!   reports a live descriptor
//! - [`wakeup_pipe`] single-byte self-pipe used to rewake the monitor
//! - [`ConnectionMonitor`] that watches the live descriptor and drives
//!   recovery after the service reports the connection closed
//!
//! # Example
//!
//! ```ignore
//! let (monitor, handle) = ConnectionMonitor::new(endpoint, observer, &config.recovery)?;
//! tokio::spawn(monitor.run(shutdown.signal()));
//!
//! // later, from the service's "connection closed" callback
//! handle.connection_closed()?;
//! ```

mod backoff;
mod endpoint;
mod error;
mod monitor;
mod timer;
mod wakeup;

#[cfg(test)]
mod test_support;

pub use backoff::Backoff;
pub use endpoint::{ServiceDescriptor, ServiceEndpoint};
pub use error::{RecoveryError, RecoveryResult};
pub use monitor::{ConnectionMonitor, MonitorHandle, MonitorState, NoopObserver, RecoveryObserver};
pub use timer::RetryTimer;
pub use wakeup::{WakeupMessage, WakeupReceiver, WakeupSender, wakeup_pipe};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ConnectionMonitor, MonitorHandle, MonitorState, RecoveryError, RecoveryObserver,
        RecoveryResult, RetryTimer, ServiceDescriptor, ServiceEndpoint, WakeupMessage,
    };
}
