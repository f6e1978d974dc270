//! Error types for WebWorks extensions

use thiserror::Error;

/// Result type alias for extension operations
pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Error type for extension operations
#[derive(Error, Debug)]
pub enum ExtensionError {
    /// Extension is not in a valid state for the requested operation
    #[error("invalid lifecycle state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Failed to initialize the extension
    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    /// Failed to shutdown the extension
    #[error("shutdown failed: {0}")]
    ShutdownFailed(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The command name is not understood by the extension
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The command arguments could not be interpreted
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Async runtime error
    #[error("runtime error: {0}")]
    RuntimeError(String),

    /// Connection recovery could not be started or failed
    #[error("recovery error: {0}")]
    RecoveryError(String),

    /// The underlying platform service rejected the call
    #[error("service error: {0}")]
    ServiceError(String),

    /// Operation timed out
    #[error("operation timed out")]
    Timeout,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),

    /// FFI error
    #[error("FFI error: {0}")]
    FfiError(String),

    /// No extension class is registered under this name
    #[error("unknown extension class: {0}")]
    UnknownClass(String),
}

impl ExtensionError {
    /// Returns an error code suitable for the C ABI
    pub fn error_code(&self) -> u32 {
        match self {
            ExtensionError::InvalidState { .. } => 1,
            ExtensionError::InitializationFailed(_) => 2,
            ExtensionError::ShutdownFailed(_) => 3,
            ExtensionError::ConfigError(_) => 4,
            ExtensionError::SerializationError(_) => 5,
            ExtensionError::UnknownCommand(_) => 6,
            ExtensionError::InvalidArguments(_) => 7,
            ExtensionError::RuntimeError(_) => 8,
            ExtensionError::RecoveryError(_) => 9,
            ExtensionError::ServiceError(_) => 10,
            ExtensionError::Timeout => 11,
            ExtensionError::Internal(_) => 12,
            ExtensionError::FfiError(_) => 13,
            ExtensionError::UnknownClass(_) => 14,
        }
    }

    /// Rebuild an error from a code and message (for host-side decoding)
    pub fn from_code(code: u32, message: String) -> Self {
        match code {
            1 => ExtensionError::InvalidState {
                expected: String::new(),
                actual: message,
            },
            2 => ExtensionError::InitializationFailed(message),
            3 => ExtensionError::ShutdownFailed(message),
            4 => ExtensionError::ConfigError(message),
            5 => ExtensionError::SerializationError(message),
            6 => ExtensionError::UnknownCommand(message),
            7 => ExtensionError::InvalidArguments(message),
            8 => ExtensionError::RuntimeError(message),
            9 => ExtensionError::RecoveryError(message),
            10 => ExtensionError::ServiceError(message),
            11 => ExtensionError::Timeout,
            13 => ExtensionError::FfiError(message),
            14 => ExtensionError::UnknownClass(message),
            _ => ExtensionError::Internal(message),
        }
    }
}

impl From<serde_json::Error> for ExtensionError {
    fn from(err: serde_json::Error) -> Self {
        ExtensionError::SerializationError(err.to_string())
    }
}
