//! Tokio runtime management

use crate::shutdown::{ShutdownHandle, ShutdownSignal};
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use webworks_core::{ExtensionError, ExtensionResult};

/// Configuration for the async runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads (None = number of CPU cores)
    pub worker_threads: Option<usize>,
    /// Name prefix for worker threads
    pub thread_name: String,
    /// Maximum blocking threads
    pub max_blocking_threads: usize,
    /// How long teardown waits for in-flight tasks
    pub shutdown_grace: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: "webworks-ext".to_string(),
            max_blocking_threads: 64,
            shutdown_grace: Duration::from_secs(1),
        }
    }
}

impl RuntimeConfig {
    /// Create a new runtime configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Set the thread name prefix
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set the teardown grace period
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }
}

/// Owns the Tokio runtime of one extension object
///
/// Every object gets its own multi-threaded runtime, so a stuck platform
/// call in one extension cannot starve another.
pub struct AsyncRuntime {
    runtime: Option<Runtime>,
    handle: Handle,
    shutdown_handle: ShutdownHandle,
    config: RuntimeConfig,
}

impl AsyncRuntime {
    /// Create a new async runtime with the given configuration
    pub fn new(config: RuntimeConfig) -> ExtensionResult<Self> {
        let mut builder = Builder::new_multi_thread();

        if let Some(threads) = config.worker_threads {
            builder.worker_threads(threads);
        }

        let runtime = builder
            .thread_name(&config.thread_name)
            .max_blocking_threads(config.max_blocking_threads)
            .enable_io()
            .enable_time()
            .build()
            .map_err(|e| ExtensionError::RuntimeError(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            shutdown_handle: ShutdownHandle::new(),
            config,
        })
    }

    /// Create a runtime with default configuration
    pub fn with_defaults() -> ExtensionResult<Self> {
        Self::new(RuntimeConfig::default())
    }

    /// Get the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Get a handle to the underlying Tokio runtime
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Get a shutdown signal that can be used to detect shutdown
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown_handle.signal()
    }

    /// Block on a future from a sync context
    pub fn block_on<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        self.handle.block_on(future)
    }

    /// Spawn a task on the runtime
    pub fn spawn<F>(&self, future: F) -> tokio::task::JoinHandle<F::Output>
    where
        F: std::future::Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }

    /// Signal shutdown to every task watching this runtime's signal
    ///
    /// Worker threads are torn down when the runtime is dropped.
    pub fn shutdown(&self) {
        if self.shutdown_handle.trigger() {
            tracing::info!(
                grace_ms = self.config.shutdown_grace.as_millis() as u64,
                "runtime shutdown requested"
            );
        }
    }

    /// Check if shutdown has been triggered
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_handle.is_triggered()
    }
}

impl Drop for AsyncRuntime {
    fn drop(&mut self) {
        self.shutdown_handle.trigger();

        if let Some(runtime) = self.runtime.take() {
            // Blocking teardown is not allowed from inside another runtime.
            if Handle::try_current().is_ok() {
                runtime.shutdown_background();
            } else {
                runtime.shutdown_timeout(self.config.shutdown_grace);
            }
        }
    }
}

#[cfg(test)]
#[path = "runtime/runtime_tests.rs"]
mod runtime_tests;
