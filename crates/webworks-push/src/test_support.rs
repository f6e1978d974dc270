//! In-process push service used by the unit tests

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::os::fd::AsRawFd;
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use tokio::sync::mpsc;
use webworks_core::{EventEmitter, EventSink, ExtensionConfig, ExtensionContext};
use webworks_recovery::ServiceDescriptor;

use crate::error::{PushError, PushResult};
use crate::payload::PushPayload;
use crate::service::{PushConnector, PushListener, PushService, StartOptions};
use crate::status::{PushCommand, PushStatus};

/// Push service backed by a socket pair
///
/// The test keeps the peer end: writing `S` or `T` to it simulates a SIM
/// change or transport-ready notification, dropping it closes the
/// connection.
pub(crate) struct FakeService {
    listener: Arc<dyn PushListener>,
    stream: Mutex<Option<UnixStream>>,
    peer: Mutex<Option<UnixStream>>,
    session_results: Mutex<VecDeque<PushStatus>>,
    channel_results: Mutex<VecDeque<PushStatus>>,
    calls: Mutex<Vec<String>>,
}

impl FakeService {
    fn new(listener: Arc<dyn PushListener>) -> Arc<Self> {
        let service = Arc::new(Self {
            listener,
            stream: Mutex::new(None),
            peer: Mutex::new(None),
            session_results: Mutex::new(VecDeque::new()),
            channel_results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        });
        service.reconnect();
        service
    }

    /// Bring the service connection (back) up with a fresh socket pair
    pub(crate) fn reconnect(&self) {
        let (ours, theirs) = UnixStream::pair().unwrap();
        ours.set_nonblocking(true).unwrap();
        *self.stream.lock() = Some(ours);
        *self.peer.lock() = Some(theirs);
    }

    /// Close the connection from the service side
    pub(crate) fn drop_peer(&self) {
        self.peer.lock().take();
    }

    pub(crate) fn send(&self, bytes: &[u8]) {
        use std::io::Write;
        if let Some(peer) = self.peer.lock().as_mut() {
            peer.write_all(bytes).unwrap();
        }
    }

    pub(crate) fn next_session_result(&self, status: PushStatus) {
        self.session_results.lock().push_back(status);
    }

    pub(crate) fn next_channel_result(&self, status: PushStatus) {
        self.channel_results.lock().push_back(status);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }
}

impl PushService for FakeService {
    fn create_session(&self) {
        self.record("createSession");
        let status = self
            .session_results
            .lock()
            .pop_front()
            .unwrap_or(PushStatus::SUCCESS);
        self.listener.on_create_session_complete(status);
    }

    fn create_channel(&self, ppg_url: &str) {
        self.record(format!("createChannel {ppg_url}"));
        let status = self
            .channel_results
            .lock()
            .pop_front()
            .unwrap_or(PushStatus::SUCCESS);
        let token = if status.is_success() { "token-1" } else { "" };
        self.listener.on_create_channel_complete(status, token);
    }

    fn destroy_channel(&self) {
        self.record("destroyChannel");
        self.listener.on_destroy_channel_complete(PushStatus::SUCCESS);
    }

    fn register_to_launch(&self) {
        self.record("registerToLaunch");
        self.listener.on_register_to_launch_complete(PushStatus::SUCCESS);
    }

    fn unregister_from_launch(&self) {
        self.record("unregisterFromLaunch");
        self.listener
            .on_unregister_from_launch_complete(PushStatus::PERMISSION_ERROR);
    }

    fn accept_push(&self, payload_id: &str) {
        self.record(format!("accept {payload_id}"));
    }

    fn reject_push(&self, payload_id: &str) {
        self.record(format!("reject {payload_id}"));
    }

    fn descriptor(&self) -> Option<ServiceDescriptor> {
        self.stream
            .lock()
            .as_ref()
            .and_then(|s| ServiceDescriptor::from_raw_fd(s.as_raw_fd()))
    }

    fn process_message(&self) {
        let mut received = Vec::new();
        let mut closed = false;
        {
            let mut stream = self.stream.lock();
            if let Some(s) = stream.as_mut() {
                let mut buf = [0u8; 64];
                loop {
                    match s.read(&mut buf) {
                        Ok(0) => {
                            closed = true;
                            break;
                        }
                        Ok(n) => received.extend_from_slice(&buf[..n]),
                        Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                        Err(_) => {
                            closed = true;
                            break;
                        }
                    }
                }
            }
            if closed {
                stream.take();
            }
        }

        for byte in received {
            match byte {
                b'S' => self.listener.on_sim_change(),
                b'T' => self
                    .listener
                    .on_push_transport_ready(PushCommand::CreateChannel),
                _ => {}
            }
        }
        if closed {
            self.listener.on_connection_close();
        }
    }

    fn parse_payload(&self, invoke_data: &[u8]) -> Option<PushPayload> {
        let data = invoke_data.strip_prefix(b"push:")?;
        Some(PushPayload {
            id: "p-1".to_string(),
            is_ack_required: true,
            data: data.to_vec(),
            headers: Default::default(),
        })
    }
}

/// Hands out [`FakeService`]s and remembers what it was asked for
#[derive(Default)]
pub(crate) struct FakeConnector {
    services: Mutex<Vec<Arc<FakeService>>>,
    options: Mutex<Vec<StartOptions>>,
    refuse: Mutex<bool>,
}

impl FakeConnector {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Most recently connected service
    pub(crate) fn service(&self) -> Arc<FakeService> {
        self.services.lock().last().cloned().unwrap()
    }

    pub(crate) fn connections(&self) -> usize {
        self.services.lock().len()
    }

    pub(crate) fn options(&self) -> Vec<StartOptions> {
        self.options.lock().clone()
    }

    pub(crate) fn refuse(&self) {
        *self.refuse.lock() = true;
    }
}

impl PushConnector for FakeConnector {
    fn connect(
        &self,
        options: &StartOptions,
        listener: Arc<dyn PushListener>,
    ) -> PushResult<Arc<dyn PushService>> {
        if *self.refuse.lock() {
            return Err(PushError::ConnectFailed(format!(
                "{} is not registered",
                options.app_id
            )));
        }
        let service = FakeService::new(listener);
        self.services.lock().push(service.clone());
        self.options.lock().push(options.clone());
        Ok(service)
    }
}

/// Forwards every event into a channel
pub(crate) struct ChannelSink(mpsc::UnboundedSender<String>);

impl EventSink for ChannelSink {
    fn send(&self, event: &str) {
        let _ = self.0.send(event.to_string());
    }
}

pub(crate) fn context(config: ExtensionConfig) -> (ExtensionContext, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let events = EventEmitter::new("7", Arc::new(ChannelSink(tx)));
    (ExtensionContext::new(config, events), rx)
}

pub(crate) fn drain(events: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

pub(crate) const START_ARGS: &str =
    r#"{"invokeTargetId":"sample.pushcapture.invoke.push","appId":"1-RDce63it6363","ppgUrl":"http://cp.pushapi.na.blackberry.com"}"#;
