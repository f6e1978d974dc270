//! Error types for connection recovery

use std::io;
use thiserror::Error;
use webworks_core::ExtensionError;

/// Errors raised by the retry timer, wakeup pipe, and connection monitor
#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("retry timer is already running")]
    AlreadyRunning,

    #[error("failed to spawn retry loop: {0}")]
    SpawnFailed(String),

    #[error("failed to create wakeup pipe: {0}")]
    PipeCreation(#[source] io::Error),

    #[error("wakeup pipe closed")]
    PipeClosed,

    #[error("failed to write wakeup byte: {0}")]
    WakeupFailed(#[source] io::Error),

    #[error("monitor wait failed: {0}")]
    WaitFailed(#[source] io::Error),

    #[error("invalid recovery configuration: {0}")]
    InvalidConfig(String),

    #[error("connection monitor has stopped")]
    MonitorStopped,
}

impl RecoveryError {
    /// Whether the monitor must stop after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RecoveryError::PipeClosed | RecoveryError::WaitFailed(_)
        )
    }
}

/// Result type alias for recovery operations
pub type RecoveryResult<T> = Result<T, RecoveryError>;

impl From<RecoveryError> for ExtensionError {
    fn from(err: RecoveryError) -> Self {
        ExtensionError::RecoveryError(err.to_string())
    }
}
