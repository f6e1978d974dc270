//! The `Push` extension object

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};
use webworks_core::{
    Extension, ExtensionContext, ExtensionError, ExtensionMetadata, ExtensionResult,
};
use webworks_recovery::MonitorState;

use crate::error::{PushError, PushResult};
use crate::service::{PushConnector, StartOptions};
use crate::session::PushSession;

/// Class name the host instantiates
pub const PUSH_CLASS: &str = "Push";

const COMMANDS: &[&str] = &[
    "startService",
    "createChannel",
    "destroyChannel",
    "extractPushPayload",
    "registerToLaunch",
    "unregisterFromLaunch",
    "acknowledge",
];

#[derive(Debug, Deserialize)]
struct ExtractArgs {
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AcknowledgeArgs {
    id: String,
    should_accept_push: bool,
}

/// Push service access for one JavaScript `Push` object
///
/// Requests are forwarded to the platform service and their completions come
/// back as events. A dropped service connection is recovered in the
/// background; requests that failed with "connection closed" are reported
/// through `push.create.pushServiceConnectionReadyCallback` once the session
/// has been re-created.
pub struct PushExtension {
    connector: Arc<dyn PushConnector>,
    session: OnceCell<Arc<PushSession>>,
}

impl PushExtension {
    pub fn new(connector: Arc<dyn PushConnector>) -> Self {
        Self {
            connector,
            session: OnceCell::new(),
        }
    }

    /// State of the connection monitor, `None` before `startService`
    pub fn monitor_state(&self) -> Option<MonitorState> {
        self.session.get().and_then(|s| s.monitor_state())
    }

    fn session(&self) -> ExtensionResult<&Arc<PushSession>> {
        self.session.get().ok_or_else(|| ExtensionError::InvalidState {
            expected: "started extension".to_string(),
            actual: "not started".to_string(),
        })
    }
}

fn parse_args<T: DeserializeOwned>(command: &'static str, args: &str) -> PushResult<T> {
    serde_json::from_str(args).map_err(|source| PushError::InvalidArguments { command, source })
}

#[async_trait]
impl Extension for PushExtension {
    async fn on_start(&self, ctx: &ExtensionContext) -> ExtensionResult<()> {
        let session = PushSession::new(self.connector.clone(), ctx.events().clone(), &ctx.config);
        self.session
            .set(session)
            .map_err(|_| ExtensionError::InvalidState {
                expected: "new push extension".to_string(),
                actual: "already started".to_string(),
            })?;
        info!(object_id = ctx.object_id(), "push extension started");
        Ok(())
    }

    async fn invoke(
        &self,
        _ctx: &ExtensionContext,
        command: &str,
        args: &str,
    ) -> ExtensionResult<String> {
        let session = self.session()?;
        debug!(command, "push command");

        match command {
            "startService" => {
                let options: StartOptions = parse_args("startService", args)?;
                session.start_service(options).await?;
            }
            "createChannel" => session.create_channel()?,
            "destroyChannel" => session.destroy_channel()?,
            "extractPushPayload" => {
                let extract: ExtractArgs = parse_args("extractPushPayload", args)?;
                return Ok(session.extract_payload(&extract.data)?);
            }
            "registerToLaunch" => session.register_to_launch()?,
            "unregisterFromLaunch" => session.unregister_from_launch()?,
            "acknowledge" => {
                let ack: AcknowledgeArgs = parse_args("acknowledge", args)?;
                session.acknowledge(&ack.id, ack.should_accept_push)?;
            }
            _ => return Err(ExtensionError::UnknownCommand(command.to_string())),
        }
        Ok(String::new())
    }

    async fn on_stop(&self, ctx: &ExtensionContext) -> ExtensionResult<()> {
        if let Some(session) = self.session.get() {
            session.stop_service().await;
        }
        info!(object_id = ctx.object_id(), "push extension stopped");
        Ok(())
    }

    fn metadata(&self) -> Option<ExtensionMetadata> {
        Some(
            ExtensionMetadata::new(PUSH_CLASS, env!("CARGO_PKG_VERSION"))
                .with_description("Push service channels with automatic connection recovery"),
        )
    }

    fn supported_commands(&self) -> Vec<&'static str> {
        COMMANDS.to_vec()
    }
}

#[cfg(test)]
#[path = "extension/extension_tests.rs"]
mod extension_tests;
