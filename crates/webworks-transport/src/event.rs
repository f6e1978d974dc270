//! Event strings delivered to the host

use crate::CodecError;
use std::fmt;

/// Body of an event: `"<eventName> <arg> <arg> ..."`
///
/// The object id prefix is added by the emitter that owns the object, so a
/// `PluginEvent` can be built without knowing which object it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEvent {
    name: String,
    args: Vec<String>,
}

impl PluginEvent {
    /// Start an event with no payload
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append a plain argument
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(value.to_string());
        self
    }

    /// Event name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded arguments, in order
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for PluginEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A complete event line as the host receives it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEvent {
    /// Object the event is addressed to
    pub object_id: String,
    /// Event name
    pub name: String,
    /// Remaining text after the name (may be empty)
    pub payload: String,
}

impl EncodedEvent {
    /// Parse `"<objectId> <eventName> <payload>"`
    pub fn parse(line: &str) -> Result<Self, CodecError> {
        let (object_id, rest) = line
            .split_once(' ')
            .ok_or_else(|| CodecError::InvalidFormat(format!("missing event name in {line:?}")))?;
        let (name, payload) = rest.split_once(' ').unwrap_or((rest, ""));

        if object_id.is_empty() || name.is_empty() {
            return Err(CodecError::InvalidFormat(format!("malformed event {line:?}")));
        }

        Ok(Self {
            object_id: object_id.to_string(),
            name: name.to_string(),
            payload: payload.to_string(),
        })
    }

    /// Payload split on spaces
    pub fn payload_args(&self) -> Vec<&str> {
        self.payload.split(' ').filter(|s| !s.is_empty()).collect()
    }
}
