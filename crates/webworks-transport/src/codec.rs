//! JSON argument codec

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use webworks_core::ExtensionError;

/// Errors that can occur while encoding or decoding ABI strings
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CodecError::Deserialization(err.to_string())
        } else {
            CodecError::Serialization(err.to_string())
        }
    }
}

impl From<CodecError> for ExtensionError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Serialization(msg) => ExtensionError::SerializationError(msg),
            CodecError::Deserialization(msg) | CodecError::InvalidFormat(msg) => {
                ExtensionError::InvalidArguments(msg)
            }
        }
    }
}

/// JSON codec for command arguments and event payloads
///
/// Output is always compact: event payloads are space-delimited on the wire,
/// so pretty-printing would split them.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec
    pub fn new() -> Self {
        Self
    }

    /// Encode a value to a compact JSON string
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(Into::into)
    }

    /// Decode a JSON string to a value
    ///
    /// Blank input is rejected rather than treated as `null`.
    pub fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, CodecError> {
        if data.trim().is_empty() {
            return Err(CodecError::InvalidFormat("expected JSON, got nothing".to_string()));
        }
        serde_json::from_str(data).map_err(Into::into)
    }
}
