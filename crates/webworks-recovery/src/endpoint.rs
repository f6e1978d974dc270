//! Service seam consumed by the retry timer and connection monitor

use async_trait::async_trait;
use std::io;
use std::os::fd::{AsRawFd, RawFd};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

/// Descriptor of a live connection to the push service
///
/// Borrowed from the service, never owned: dropping it does not close the fd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceDescriptor(pub(crate) RawFd);

impl ServiceDescriptor {
    /// Wrap a raw fd; negative values are the service's "no connection" sentinel
    pub fn from_raw_fd(fd: RawFd) -> Option<Self> {
        (fd >= 0).then_some(Self(fd))
    }

    pub fn raw(&self) -> RawFd {
        self.0
    }
}

impl AsRawFd for ServiceDescriptor {
    fn as_raw_fd(&self) -> RawFd {
        self.0
    }
}

impl std::fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fd {}", self.0)
    }
}

/// What recovery needs from the push service
#[async_trait]
pub trait ServiceEndpoint: Send + Sync + 'static {
    /// Current live descriptor, or `None` while disconnected
    ///
    /// Must not block and must not have side effects; it is polled from the
    /// retry loop.
    fn current_descriptor(&self) -> Option<ServiceDescriptor>;

    /// Wait until the descriptor has incoming data
    async fn readable(&self, descriptor: ServiceDescriptor) -> io::Result<()> {
        let fd = AsyncFd::with_interest(descriptor, Interest::READABLE)?;
        let _ready = fd.readable().await?;
        Ok(())
    }

    /// Consume whatever made the descriptor readable
    fn process_incoming(&self, descriptor: ServiceDescriptor);
}
