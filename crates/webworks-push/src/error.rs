//! Error types for the push extension

use thiserror::Error;
use webworks_core::ExtensionError;
use webworks_recovery::RecoveryError;

/// Errors raised while handling push commands
#[derive(Error, Debug)]
pub enum PushError {
    #[error("push service has not been started")]
    NotStarted,

    #[error("invalid {command} arguments: {source}")]
    InvalidArguments {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to connect to push service: {0}")]
    ConnectFailed(String),

    #[error("failed to encode push payload: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Recovery(#[from] RecoveryError),
}

/// Result type alias for push operations
pub type PushResult<T> = Result<T, PushError>;

impl From<PushError> for ExtensionError {
    fn from(err: PushError) -> Self {
        match err {
            PushError::NotStarted => ExtensionError::InvalidState {
                expected: "started push service".to_string(),
                actual: "no push service".to_string(),
            },
            e @ PushError::InvalidArguments { .. } => {
                ExtensionError::InvalidArguments(e.to_string())
            }
            PushError::ConnectFailed(msg) => ExtensionError::ServiceError(msg),
            e @ PushError::Encode(_) => ExtensionError::SerializationError(e.to_string()),
            PushError::Recovery(e) => e.into(),
        }
    }
}
