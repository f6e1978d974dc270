//! webworks-transport - String encoding for the extension ABI
//!
//! The host runtime talks to native extensions in plain strings:
//! - [`Command`] splits an invocation `"<commandName> <args>"`
//! - [`PluginEvent`] builds the `"<eventName> <payload...>"` body of an event
//! - [`EncodedEvent`] parses a complete `"<objectId> <eventName> <payload>"` line
//! - [`JsonCodec`] decodes and encodes JSON arguments

mod codec;
mod command;
mod event;

pub use codec::{CodecError, JsonCodec};
pub use command::Command;
pub use event::{EncodedEvent, PluginEvent};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{CodecError, Command, EncodedEvent, JsonCodec, PluginEvent};
}
