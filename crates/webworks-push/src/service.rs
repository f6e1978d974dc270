//! Seam to the platform push service

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use webworks_recovery::ServiceDescriptor;

use crate::error::PushResult;
use crate::payload::PushPayload;
use crate::status::{PushCommand, PushStatus};

/// Arguments of `startService`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    pub invoke_target_id: String,
    pub app_id: String,
    /// Push Proxy Gateway used when creating a channel (public/BIS pushes)
    #[serde(default)]
    pub ppg_url: String,
}

impl StartOptions {
    /// Whether both options address the same push service registration
    pub fn same_registration(&self, other: &StartOptions) -> bool {
        self.app_id == other.app_id && self.invoke_target_id == other.invoke_target_id
    }
}

/// Requests the extension makes of the platform push service
///
/// Requests return immediately and complete through the [`PushListener`] the
/// service was connected with. A service may call the listener from inside
/// the request or later from [`PushService::process_message`]; the extension
/// holds none of its own locks across either.
pub trait PushService: Send + Sync + 'static {
    fn create_session(&self);

    fn create_channel(&self, ppg_url: &str);

    fn destroy_channel(&self);

    fn register_to_launch(&self);

    fn unregister_from_launch(&self);

    fn accept_push(&self, payload_id: &str);

    fn reject_push(&self, payload_id: &str);

    /// Descriptor of the live connection to the push service
    ///
    /// `None` while the service is unreachable. Polled by connection
    /// recovery, so it must be cheap and must not block.
    fn descriptor(&self) -> Option<ServiceDescriptor>;

    /// Handle whatever made the descriptor readable
    ///
    /// Completions, pushes and `on_connection_close` are dispatched from here.
    fn process_message(&self);

    /// Parse decoded invocation data; `None` if it does not hold a push
    fn parse_payload(&self, invoke_data: &[u8]) -> Option<PushPayload>;
}

/// Completion callbacks from the push service
pub trait PushListener: Send + Sync + 'static {
    fn on_create_session_complete(&self, status: PushStatus);

    fn on_create_channel_complete(&self, status: PushStatus, token: &str);

    fn on_destroy_channel_complete(&self, status: PushStatus);

    fn on_register_to_launch_complete(&self, status: PushStatus);

    fn on_unregister_from_launch_complete(&self, status: PushStatus);

    /// The SIM card changed; the application must re-register
    fn on_sim_change(&self);

    /// The transport is usable again after `command` failed with a
    /// transport error
    fn on_push_transport_ready(&self, command: PushCommand);

    /// The service connection dropped
    fn on_connection_close(&self);
}

/// Opens push service connections for `startService`
pub trait PushConnector: Send + Sync + 'static {
    fn connect(
        &self,
        options: &StartOptions,
        listener: Arc<dyn PushListener>,
    ) -> PushResult<Arc<dyn PushService>>;
}
