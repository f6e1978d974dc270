//! Push session state shared by commands, service callbacks and recovery

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use webworks_core::{EventEmitter, ExtensionConfig, RecoveryConfig};
use webworks_recovery::{ConnectionMonitor, MonitorHandle, MonitorState, RecoveryResult};
use webworks_runtime::ShutdownHandle;
use webworks_transport::PluginEvent;

use crate::error::{PushError, PushResult};
use crate::link::SessionLink;
use crate::payload::{PayloadReport, decode_invoke_data};
use crate::service::{PushConnector, PushService, StartOptions};
use crate::status::{PushCommand, PushStatus};

const CREATE_CALLBACK: &str = "push.create.callback";
const CREATE_CHANNEL_CALLBACK: &str = "push.createChannel.callback";
const DESTROY_CHANNEL_CALLBACK: &str = "push.destroyChannel.callback";
const LAUNCH_CALLBACK: &str = "push.launchApplicationOnPush.callback";
const SIM_CHANGE: &str = "push.create.simChangeCallback";
const TRANSPORT_READY: &str = "push.create.pushTransportReadyCallback";
const CONNECTION_READY: &str = "push.create.pushServiceConnectionReadyCallback";

struct ServiceSlot {
    options: StartOptions,
    service: Arc<dyn PushService>,
}

#[derive(Debug, Default)]
struct ReconnectState {
    /// Last operation that failed because the connection closed
    closed_during: Option<PushCommand>,
    /// The pending session request was issued by recovery, not by JavaScript
    recreating: bool,
}

struct MonitorTask {
    handle: MonitorHandle,
    shutdown: ShutdownHandle,
    task: JoinHandle<RecoveryResult<()>>,
}

/// State behind one `Push` object
///
/// Locks here only guard plain data. The service is cloned out before any
/// call into it, because the service may call straight back into the
/// session from inside a request.
pub(crate) struct PushSession {
    connector: Arc<dyn PushConnector>,
    events: EventEmitter,
    recovery: RecoveryConfig,
    shutdown_timeout: Duration,
    service: Mutex<Option<ServiceSlot>>,
    reconnect: Mutex<ReconnectState>,
    monitor: Mutex<Option<MonitorTask>>,
}

impl PushSession {
    pub(crate) fn new(
        connector: Arc<dyn PushConnector>,
        events: EventEmitter,
        config: &ExtensionConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            connector,
            events,
            recovery: config.recovery,
            shutdown_timeout: config.shutdown_timeout(),
            service: Mutex::new(None),
            reconnect: Mutex::new(ReconnectState::default()),
            monitor: Mutex::new(None),
        })
    }

    pub(crate) fn service(&self) -> PushResult<Arc<dyn PushService>> {
        self.service
            .lock()
            .as_ref()
            .map(|slot| slot.service.clone())
            .ok_or(PushError::NotStarted)
    }

    pub(crate) fn monitor_state(&self) -> Option<MonitorState> {
        self.monitor_handle().map(|handle| handle.state())
    }

    fn monitor_handle(&self) -> Option<MonitorHandle> {
        self.monitor.lock().as_ref().map(|m| m.handle.clone())
    }

    /// Connect (or reuse the connection for the same registration) and
    /// request a session
    pub(crate) async fn start_service(self: &Arc<Self>, options: StartOptions) -> PushResult<()> {
        let reused = {
            let mut slot = self.service.lock();
            match slot.as_mut() {
                Some(current) if current.options.same_registration(&options) => {
                    current.options.ppg_url = options.ppg_url.clone();
                    Some(current.service.clone())
                }
                _ => None,
            }
        };

        let service = match reused {
            Some(service) => service,
            None => {
                self.stop_service().await;
                let listener = Arc::new(SessionLink::new(self));
                let service = self.connector.connect(&options, listener)?;
                info!(
                    app_id = %options.app_id,
                    invoke_target = %options.invoke_target_id,
                    "connected to push service"
                );
                *self.service.lock() = Some(ServiceSlot {
                    options,
                    service: service.clone(),
                });
                service
            }
        };

        self.ensure_monitor()?;
        service.create_session();
        Ok(())
    }

    fn ensure_monitor(self: &Arc<Self>) -> PushResult<()> {
        if self
            .monitor
            .lock()
            .as_ref()
            .is_some_and(|m| !m.task.is_finished())
        {
            return Ok(());
        }

        // Built outside the lock: creating the monitor queries the service.
        let link = Arc::new(SessionLink::new(self));
        let (monitor, handle) = ConnectionMonitor::new(link.clone(), link, &self.recovery)?;
        let shutdown = ShutdownHandle::new();
        let task = tokio::spawn(monitor.run(shutdown.signal()));
        debug!(state = %handle.state(), "push connection monitor spawned");

        let replaced = self.monitor.lock().replace(MonitorTask {
            handle,
            shutdown,
            task,
        });
        if let Some(stale) = replaced {
            stale.shutdown.trigger();
        }
        Ok(())
    }

    /// Stop the monitor and release the service connection
    pub(crate) async fn stop_service(&self) {
        let monitor = self.monitor.lock().take();
        if let Some(monitor) = monitor {
            monitor.shutdown.trigger();
            match tokio::time::timeout(self.shutdown_timeout, monitor.task).await {
                Ok(Ok(Ok(()))) => debug!("push connection monitor stopped"),
                Ok(Ok(Err(e))) => warn!(error = %e, "push connection monitor ended with error"),
                Ok(Err(e)) => warn!(error = %e, "push connection monitor task failed"),
                Err(_) => warn!(
                    timeout_ms = self.shutdown_timeout.as_millis() as u64,
                    "push connection monitor did not stop in time"
                ),
            }
        }

        let released = self.service.lock().take();
        if let Some(slot) = released {
            info!(app_id = %slot.options.app_id, "released push service");
        }
        *self.reconnect.lock() = ReconnectState::default();
    }

    pub(crate) fn create_channel(&self) -> PushResult<()> {
        let (service, ppg_url) = {
            let slot = self.service.lock();
            let slot = slot.as_ref().ok_or(PushError::NotStarted)?;
            (slot.service.clone(), slot.options.ppg_url.clone())
        };
        service.create_channel(&ppg_url);
        Ok(())
    }

    pub(crate) fn destroy_channel(&self) -> PushResult<()> {
        self.service()?.destroy_channel();
        Ok(())
    }

    pub(crate) fn register_to_launch(&self) -> PushResult<()> {
        self.service()?.register_to_launch();
        Ok(())
    }

    pub(crate) fn unregister_from_launch(&self) -> PushResult<()> {
        self.service()?.unregister_from_launch();
        Ok(())
    }

    pub(crate) fn acknowledge(&self, payload_id: &str, accept: bool) -> PushResult<()> {
        let service = self.service()?;
        debug!(payload_id, accept, "acknowledging push");
        if accept {
            service.accept_push(payload_id);
        } else {
            service.reject_push(payload_id);
        }
        Ok(())
    }

    pub(crate) fn extract_payload(&self, encoded: &str) -> PushResult<String> {
        let service = self.service()?;
        let report = match decode_invoke_data(encoded) {
            Ok(data) => PayloadReport::from_parsed(service.parse_payload(&data)),
            Err(e) => {
                warn!(error = %e, "push invocation data is not base64");
                PayloadReport::invalid()
            }
        };
        report.to_json()
    }

    fn emit(&self, event: PluginEvent) {
        debug!(event = event.name(), "push event");
        self.events.notify(event);
    }

    fn note_status(&self, status: PushStatus, command: PushCommand) {
        if status.is_connection_closed() {
            warn!(%command, "push request failed: service connection closed");
            self.reconnect.lock().closed_during = Some(command);
        }
    }

    pub(crate) fn session_created(&self, status: PushStatus) {
        let recreated = std::mem::take(&mut self.reconnect.lock().recreating);
        self.note_status(status, PushCommand::CreateSession);

        if recreated {
            let ready = if status.is_success() {
                self.reconnect.lock().closed_during.take()
            } else {
                None
            };
            match ready {
                Some(command) => {
                    info!(%command, "push service connection ready again");
                    self.emit(PluginEvent::new(CONNECTION_READY).arg(command));
                }
                None => debug!(%status, "push session re-created"),
            }
        } else {
            self.emit(PluginEvent::new(CREATE_CALLBACK).arg(status));
        }

        if status.is_success()
            && let Some(monitor) = self.monitor_handle()
            && let Err(e) = monitor.refresh()
        {
            warn!(error = %e, "failed to refresh connection monitor");
        }
    }

    pub(crate) fn channel_created(&self, status: PushStatus, token: &str) {
        self.note_status(status, PushCommand::CreateChannel);
        self.emit(
            PluginEvent::new(CREATE_CHANNEL_CALLBACK)
                .arg(status)
                .arg(token),
        );
    }

    pub(crate) fn channel_destroyed(&self, status: PushStatus) {
        self.note_status(status, PushCommand::DestroyChannel);
        self.emit(PluginEvent::new(DESTROY_CHANNEL_CALLBACK).arg(status));
    }

    pub(crate) fn launch_registration_changed(&self, status: PushStatus) {
        self.note_status(status, PushCommand::LaunchApplicationOnPush);
        self.emit(PluginEvent::new(LAUNCH_CALLBACK).arg(status));
    }

    pub(crate) fn sim_changed(&self) {
        self.emit(PluginEvent::new(SIM_CHANGE));
    }

    pub(crate) fn transport_ready(&self, command: PushCommand) {
        self.emit(PluginEvent::new(TRANSPORT_READY).arg(command));
    }

    pub(crate) fn connection_closed(&self) {
        match self.monitor_handle() {
            Some(monitor) => {
                if let Err(e) = monitor.connection_closed() {
                    warn!(error = %e, "could not start push connection recovery");
                }
            }
            None => warn!("push connection closed with no monitor running"),
        }
    }

    /// Re-create the session once recovery sees the service again
    pub(crate) fn connection_restored(&self) {
        let Ok(service) = self.service() else {
            debug!("push service released before the connection came back");
            return;
        };
        self.reconnect.lock().recreating = true;
        info!("re-creating push session");
        service.create_session();
    }
}
