//! Bridge between synchronous ABI calls and async handlers

use crate::{AsyncRuntime, ShutdownSignal};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use webworks_core::{ExtensionError, ExtensionResult};

/// Runs async extension code on behalf of the host's blocking calls
pub struct AsyncBridge {
    runtime: Arc<AsyncRuntime>,
    call_counter: AtomicU64,
}

impl AsyncBridge {
    /// Create a new async bridge
    pub fn new(runtime: Arc<AsyncRuntime>) -> Self {
        Self {
            runtime,
            call_counter: AtomicU64::new(0),
        }
    }

    /// Next call id, used to correlate log lines of one invocation
    pub fn next_call_id(&self) -> u64 {
        self.call_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Execute an async operation synchronously (blocking)
    pub fn call_sync<F, T>(&self, future: F) -> ExtensionResult<T>
    where
        F: Future<Output = ExtensionResult<T>>,
    {
        if self.runtime.is_shutting_down() {
            return Err(ExtensionError::RuntimeError(
                "Runtime is shutting down".to_string(),
            ));
        }
        self.runtime.block_on(future)
    }

    /// Execute an async operation with timeout
    ///
    /// Unlike [`AsyncBridge::call_sync`] this still runs during shutdown, so
    /// `on_stop` handlers can complete.
    pub fn call_sync_timeout<F, T>(&self, future: F, timeout: Duration) -> ExtensionResult<T>
    where
        F: Future<Output = ExtensionResult<T>>,
    {
        self.runtime.block_on(async move {
            match tokio::time::timeout(timeout, future).await {
                Ok(result) => result,
                Err(_) => Err(ExtensionError::Timeout),
            }
        })
    }

    /// Spawn an async task and return a handle
    pub fn spawn<F, T>(&self, future: F) -> tokio::task::JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.runtime.spawn(future)
    }

    /// Get a shutdown signal
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.runtime.shutdown_signal()
    }

    /// Check if the runtime is shutting down
    pub fn is_shutting_down(&self) -> bool {
        self.runtime.is_shutting_down()
    }
}
