//! Extension trait and context types

use crate::{EventEmitter, ExtensionConfig, ExtensionError, ExtensionResult, LifecycleState};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU8, Ordering};

/// Context provided to extension operations
pub struct ExtensionContext {
    /// Extension configuration
    pub config: ExtensionConfig,
    /// Current lifecycle state
    state: AtomicU8,
    /// Event channel back to the JavaScript object
    events: EventEmitter,
}

impl ExtensionContext {
    /// Create a new extension context
    pub fn new(config: ExtensionConfig, events: EventEmitter) -> Self {
        Self {
            config,
            state: AtomicU8::new(LifecycleState::Installed as u8),
            events,
        }
    }

    /// Get current lifecycle state
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Set lifecycle state directly (bypassing transition validation)
    ///
    /// Use this for error recovery scenarios where normal transitions don't apply.
    pub fn set_state(&self, state: LifecycleState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    /// Attempt to transition to a new state
    pub fn transition_to(&self, target: LifecycleState) -> ExtensionResult<()> {
        let current = self.state();
        if current.can_transition_to(target) {
            self.set_state(target);
            Ok(())
        } else {
            Err(ExtensionError::InvalidState {
                expected: format!("state that can transition to {}", target),
                actual: current.to_string(),
            })
        }
    }

    /// Emitter for events addressed to this object
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Host-assigned object id
    pub fn object_id(&self) -> &str {
        self.events.object_id()
    }
}

/// A native extension object driven by the host's string ABI
///
/// The host creates one object per JavaScript wrapper, forwards every
/// `"<command> <args>"` string to [`Extension::invoke`], and receives
/// asynchronous results through the context's [`EventEmitter`].
/// The async methods are executed on the object's Tokio runtime.
///
/// # Example
///
/// ```ignore
/// use webworks_core::prelude::*;
///
/// struct Toast;
///
/// #[async_trait::async_trait]
/// impl Extension for Toast {
///     async fn on_start(&self, _ctx: &ExtensionContext) -> ExtensionResult<()> {
///         Ok(())
///     }
///
///     async fn invoke(
///         &self,
///         ctx: &ExtensionContext,
///         command: &str,
///         args: &str,
///     ) -> ExtensionResult<String> {
///         match command {
///             "show" => {
///                 ctx.events().notify(format_args!("toast.shown {args}"));
///                 Ok(String::new())
///             }
///             _ => Err(ExtensionError::UnknownCommand(command.to_string())),
///         }
///     }
///
///     async fn on_stop(&self, _ctx: &ExtensionContext) -> ExtensionResult<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Extension: Send + Sync + 'static {
    /// Called once after the object is created
    ///
    /// The extension transitions to Active after this returns successfully.
    async fn on_start(&self, ctx: &ExtensionContext) -> ExtensionResult<()>;

    /// Handle one command
    ///
    /// - `command`: method name (text before the first space)
    /// - `args`: everything after the first space, usually JSON; may be empty
    ///
    /// Returns the string handed back synchronously to JavaScript.
    async fn invoke(
        &self,
        ctx: &ExtensionContext,
        command: &str,
        args: &str,
    ) -> ExtensionResult<String>;

    /// Called when the host destroys the object
    async fn on_stop(&self, ctx: &ExtensionContext) -> ExtensionResult<()>;

    /// Whether the host may delete the object right now
    fn can_delete(&self) -> bool {
        true
    }

    /// Extension metadata
    fn metadata(&self) -> Option<crate::ExtensionMetadata> {
        None
    }

    /// Commands understood by [`Extension::invoke`]
    fn supported_commands(&self) -> Vec<&'static str> {
        Vec::new()
    }
}
