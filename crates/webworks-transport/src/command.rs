//! Invocation strings sent by the host

use crate::{CodecError, JsonCodec};
use serde::de::DeserializeOwned;

/// One parsed invocation
///
/// The host sends a single string per call. The command name runs up to the
/// first space; everything after that space is the argument text, passed
/// through untouched (it may itself contain spaces).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    name: &'a str,
    args: &'a str,
}

impl<'a> Command<'a> {
    /// Split a raw invocation string
    pub fn parse(raw: &'a str) -> Result<Self, CodecError> {
        let (name, args) = match raw.split_once(' ') {
            Some((name, args)) => (name, args),
            None => (raw, ""),
        };

        if name.is_empty() {
            return Err(CodecError::InvalidFormat(
                "command name is missing".to_string(),
            ));
        }

        Ok(Self { name, args })
    }

    /// Command name
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Raw argument text (empty when the command had none)
    pub fn args(&self) -> &'a str {
        self.args
    }

    /// Decode the arguments as JSON
    pub fn args_as<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        JsonCodec::new().decode(self.args)
    }
}
