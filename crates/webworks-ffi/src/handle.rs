//! Extension object handle management

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use webworks_core::{
    EventEmitter, Extension, ExtensionConfig, ExtensionContext, ExtensionError, ExtensionResult,
    LifecycleState, LogLevel,
};
use webworks_runtime::{AsyncBridge, AsyncRuntime, RuntimeConfig};
use webworks_transport::Command;

/// Global handle manager
static HANDLE_MANAGER: OnceCell<ExtensionHandleManager> = OnceCell::new();

/// Live extension objects keyed by the handle given to the host
pub struct ExtensionHandleManager {
    handles: DashMap<u64, Arc<ExtensionHandle>>,
    next_id: AtomicU64,
}

impl ExtensionHandleManager {
    pub fn new() -> Self {
        Self {
            handles: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Get the global handle manager
    pub fn global() -> &'static ExtensionHandleManager {
        HANDLE_MANAGER.get_or_init(ExtensionHandleManager::new)
    }

    /// Register a new handle and return its id
    pub fn register(&self, handle: ExtensionHandle) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        handle.set_id(id);
        self.handles.insert(id, Arc::new(handle));
        id
    }

    pub fn get(&self, id: u64) -> Option<Arc<ExtensionHandle>> {
        self.handles.get(&id).map(|r| r.clone())
    }

    pub fn remove(&self, id: u64) -> Option<Arc<ExtensionHandle>> {
        self.handles.remove(&id).map(|(_, v)| v)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Default for ExtensionHandleManager {
    fn default() -> Self {
        Self::new()
    }
}

/// One extension object created by the host
pub struct ExtensionHandle {
    class_name: String,
    extension: Box<dyn Extension>,
    context: ExtensionContext,
    runtime: Arc<AsyncRuntime>,
    bridge: AsyncBridge,
    id: RwLock<Option<u64>>,
}

impl ExtensionHandle {
    /// Build the object's runtime and context; the extension is not started yet
    pub fn new(
        class_name: impl Into<String>,
        extension: Box<dyn Extension>,
        config: ExtensionConfig,
        events: EventEmitter,
    ) -> ExtensionResult<Self> {
        config.validate()?;

        let mut runtime_config = RuntimeConfig::new().with_shutdown_grace(config.shutdown_timeout());
        if let Some(threads) = config.worker_threads {
            runtime_config = runtime_config.with_worker_threads(threads);
        }

        let runtime = Arc::new(AsyncRuntime::new(runtime_config)?);
        let bridge = AsyncBridge::new(runtime.clone());

        Ok(Self {
            class_name: class_name.into(),
            extension,
            context: ExtensionContext::new(config, events),
            runtime,
            bridge,
            id: RwLock::new(None),
        })
    }

    pub fn id(&self) -> Option<u64> {
        *self.id.read()
    }

    pub(crate) fn set_id(&self, id: u64) {
        *self.id.write() = Some(id);
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Object id assigned by the host
    pub fn object_id(&self) -> &str {
        self.context.object_id()
    }

    pub fn state(&self) -> LifecycleState {
        self.context.state()
    }

    /// Run the extension's `on_start` and become Active
    pub fn start(&self) -> ExtensionResult<()> {
        self.context.transition_to(LifecycleState::Starting)?;

        let result = self.bridge.call_sync(self.extension.on_start(&self.context));

        match result {
            Ok(()) => {
                self.context.transition_to(LifecycleState::Active)?;
                tracing::info!(
                    class = %self.class_name,
                    object_id = self.object_id(),
                    "extension object started"
                );
                Ok(())
            }
            Err(e) => {
                self.context.set_state(LifecycleState::Failed);
                tracing::error!(class = %self.class_name, "extension failed to start: {}", e);
                Err(e)
            }
        }
    }

    /// Run one raw `"<command> <args>"` invocation
    pub fn invoke(&self, raw: &str) -> ExtensionResult<String> {
        let state = self.context.state();
        if !state.can_handle_commands() {
            return Err(ExtensionError::InvalidState {
                expected: "Active".to_string(),
                actual: state.to_string(),
            });
        }

        let command = Command::parse(raw)?;
        let call_id = self.bridge.next_call_id();
        tracing::debug!(call_id, command = command.name(), "invoking extension");

        self.bridge.call_sync(
            self.extension
                .invoke(&self.context, command.name(), command.args()),
        )
    }

    pub fn can_delete(&self) -> bool {
        self.extension.can_delete()
    }

    /// Stop the extension and its runtime
    ///
    /// A timed out `on_stop` still counts as stopped.
    pub fn shutdown(&self) -> ExtensionResult<()> {
        let current_state = self.context.state();

        if current_state != LifecycleState::Active {
            if current_state.is_terminal() {
                return Ok(());
            }
            return Err(ExtensionError::InvalidState {
                expected: "Active".to_string(),
                actual: current_state.to_string(),
            });
        }

        self.context.transition_to(LifecycleState::Stopping)?;

        let result = self.bridge.call_sync_timeout(
            self.extension.on_stop(&self.context),
            self.context.config.shutdown_timeout(),
        );

        self.runtime.shutdown();

        match result {
            Ok(()) => {
                self.context.transition_to(LifecycleState::Stopped)?;
                tracing::info!(class = %self.class_name, "extension object stopped");
                Ok(())
            }
            Err(ExtensionError::Timeout) => {
                self.context.set_state(LifecycleState::Stopped);
                tracing::warn!(class = %self.class_name, "extension stop timed out");
                Ok(())
            }
            Err(e) => {
                self.context.set_state(LifecycleState::Failed);
                tracing::error!(class = %self.class_name, "extension stop failed: {}", e);
                Err(e)
            }
        }
    }

    /// Undo a failed [`ExtensionHandle::start`]
    ///
    /// Runs `on_stop` so anything `on_start` acquired before failing is
    /// released, then stops the runtime. The object stays `Failed`.
    pub fn release_failed_start(&self) -> ExtensionResult<()> {
        if self.context.state() != LifecycleState::Failed {
            return Err(ExtensionError::InvalidState {
                expected: "Failed".to_string(),
                actual: self.context.state().to_string(),
            });
        }

        let result = self.bridge.call_sync_timeout(
            self.extension.on_stop(&self.context),
            self.context.config.shutdown_timeout(),
        );

        self.runtime.shutdown();

        match result {
            Ok(()) => Ok(()),
            Err(ExtensionError::Timeout) => {
                tracing::warn!(class = %self.class_name, "cleanup after failed start timed out");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Set the process-wide log level
    pub fn set_log_level(&self, level: LogLevel) {
        webworks_logging::set_log_level(level);
    }

    /// Mark the object as failed after a caught panic
    ///
    /// Further invocations are rejected; the host should still destroy the
    /// object to release its runtime.
    pub fn mark_failed(&self) {
        tracing::error!(class = %self.class_name, "marking extension object as failed");
        self.context.set_state(LifecycleState::Failed);
    }
}
