//! Adapters connecting the push session to the service and to recovery

use async_trait::async_trait;
use std::sync::{Arc, Weak};
use tracing::warn;
use webworks_recovery::{RecoveryObserver, ServiceDescriptor, ServiceEndpoint};

use crate::service::PushListener;
use crate::session::PushSession;
use crate::status::{PushCommand, PushStatus};

/// Non-owning reference to a [`PushSession`]
///
/// Handed to the push service as its listener and to the connection monitor
/// as both endpoint and observer. Once the session is dropped every callback
/// becomes a no-op.
pub(crate) struct SessionLink {
    session: Weak<PushSession>,
}

impl SessionLink {
    pub(crate) fn new(session: &Arc<PushSession>) -> Self {
        Self {
            session: Arc::downgrade(session),
        }
    }

    fn with_session(&self, f: impl FnOnce(&PushSession)) {
        if let Some(session) = self.session.upgrade() {
            f(&session);
        }
    }
}

impl PushListener for SessionLink {
    fn on_create_session_complete(&self, status: PushStatus) {
        self.with_session(|s| s.session_created(status));
    }

    fn on_create_channel_complete(&self, status: PushStatus, token: &str) {
        self.with_session(|s| s.channel_created(status, token));
    }

    fn on_destroy_channel_complete(&self, status: PushStatus) {
        self.with_session(|s| s.channel_destroyed(status));
    }

    fn on_register_to_launch_complete(&self, status: PushStatus) {
        self.with_session(|s| s.launch_registration_changed(status));
    }

    fn on_unregister_from_launch_complete(&self, status: PushStatus) {
        self.with_session(|s| s.launch_registration_changed(status));
    }

    fn on_sim_change(&self) {
        self.with_session(PushSession::sim_changed);
    }

    fn on_push_transport_ready(&self, command: PushCommand) {
        self.with_session(|s| s.transport_ready(command));
    }

    fn on_connection_close(&self) {
        self.with_session(PushSession::connection_closed);
    }
}

#[async_trait]
impl ServiceEndpoint for SessionLink {
    fn current_descriptor(&self) -> Option<ServiceDescriptor> {
        let session = self.session.upgrade()?;
        let service = session.service().ok()?;
        service.descriptor()
    }

    fn process_incoming(&self, descriptor: ServiceDescriptor) {
        let Some(session) = self.session.upgrade() else {
            return;
        };
        match session.service() {
            Ok(service) => service.process_message(),
            Err(_) => warn!(%descriptor, "push data arrived after the service was released"),
        }
    }
}

impl RecoveryObserver for SessionLink {
    fn on_connection_restored(&self, _descriptor: ServiceDescriptor) {
        self.with_session(PushSession::connection_restored);
    }

    fn on_recovery_stalled(&self) {
        warn!("push connection recovery stalled; waiting for the next startService");
    }
}
