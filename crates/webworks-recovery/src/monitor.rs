//! Connection monitor driving push connection recovery

use crate::backoff::Backoff;
use crate::endpoint::{ServiceDescriptor, ServiceEndpoint};
use crate::error::{RecoveryError, RecoveryResult};
use crate::timer::RetryTimer;
use crate::wakeup::{WakeupMessage, WakeupReceiver, WakeupSender, wakeup_pipe};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use webworks_core::RecoveryConfig;
use webworks_runtime::ShutdownSignal;

/// Where the monitor is in its watch/recover cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No live descriptor and no recovery in progress
    Idle,
    /// Waiting on the live descriptor and the wakeup pipe
    Watching,
    /// Descriptor known dead, retry timer active
    Recovering,
    /// The run loop has exited
    Stopped,
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorState::Idle => write!(f, "Idle"),
            MonitorState::Watching => write!(f, "Watching"),
            MonitorState::Recovering => write!(f, "Recovering"),
            MonitorState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Hooks invoked from the monitor task as recovery progresses
///
/// Callbacks run on the monitor task and must not block for long.
pub trait RecoveryObserver: Send + Sync + 'static {
    /// The service is reachable again and is being watched
    fn on_connection_restored(&self, _descriptor: ServiceDescriptor) {}

    /// Recovery cannot make progress: the timer failed to start or died
    fn on_recovery_stalled(&self) {}
}

/// Observer that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RecoveryObserver for NoopObserver {}

#[derive(Debug)]
struct Status {
    state: MonitorState,
    descriptor: Option<ServiceDescriptor>,
}

struct MonitorShared {
    endpoint: Arc<dyn ServiceEndpoint>,
    observer: Arc<dyn RecoveryObserver>,
    timer: RetryTimer,
    wakeup: WakeupSender,
    status: Mutex<Status>,
}

/// Owns the authoritative service descriptor and the wakeup pipe's read end
///
/// Created together with a [`MonitorHandle`]; [`ConnectionMonitor::run`] is
/// the self-driving loop and the handle is how the rest of the extension
/// talks to it.
pub struct ConnectionMonitor {
    shared: Arc<MonitorShared>,
    receiver: WakeupReceiver,
}

/// Cloneable control surface of a running [`ConnectionMonitor`]
#[derive(Clone)]
pub struct MonitorHandle {
    shared: Arc<MonitorShared>,
}

enum Wake {
    Pipe(io::Result<()>),
    Service(io::Result<()>),
}

impl ConnectionMonitor {
    /// Create a monitor and its handle
    ///
    /// Must be called from within a Tokio runtime; the wakeup pipe registers
    /// with the current reactor and retry loops are spawned on it.
    pub fn new(
        endpoint: Arc<dyn ServiceEndpoint>,
        observer: Arc<dyn RecoveryObserver>,
        config: &RecoveryConfig,
    ) -> RecoveryResult<(Self, MonitorHandle)> {
        config
            .validate()
            .map_err(|e| RecoveryError::InvalidConfig(e.to_string()))?;

        let (sender, receiver) = wakeup_pipe()?;
        let timer = RetryTimer::new(endpoint.clone(), sender.clone(), Backoff::from_config(config));

        let descriptor = endpoint.current_descriptor();
        let state = if descriptor.is_some() {
            MonitorState::Watching
        } else {
            MonitorState::Idle
        };

        let shared = Arc::new(MonitorShared {
            endpoint,
            observer,
            timer,
            wakeup: sender,
            status: Mutex::new(Status { state, descriptor }),
        });

        Ok((
            Self {
                shared: shared.clone(),
                receiver,
            },
            MonitorHandle { shared },
        ))
    }

    /// Watch the service until `shutdown` fires or the wait itself fails
    ///
    /// On exit the retry timer is stopped and the state becomes
    /// [`MonitorState::Stopped`]. Dropping every shutdown handle also ends the
    /// loop.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> RecoveryResult<()> {
        info!(state = %self.shared.state(), "connection monitor started");

        let result = self.drive(&mut shutdown).await;
        self.shared.teardown();

        match &result {
            Ok(()) => info!("connection monitor stopped"),
            Err(e) => error!(error = %e, "connection monitor failed"),
        }
        result
    }

    async fn drive(&mut self, shutdown: &mut ShutdownSignal) -> RecoveryResult<()> {
        loop {
            let watched = self.shared.descriptor();

            let wake = tokio::select! {
                biased;
                _ = shutdown.wait() => return Ok(()),
                ready = self.receiver.readable() => Wake::Pipe(ready),
                ready = watch(self.shared.endpoint.as_ref(), watched) => Wake::Service(ready),
            };

            match wake {
                Wake::Pipe(ready) => {
                    ready.map_err(RecoveryError::WaitFailed)?;
                    let messages = self.receiver.drain()?;
                    if !messages.is_empty() {
                        self.shared.handle_wakeups(&messages);
                    }
                }
                Wake::Service(ready) => {
                    // A descriptor replaced mid-wait is stale, whatever it reported.
                    if self.shared.descriptor() != watched {
                        continue;
                    }
                    ready.map_err(RecoveryError::WaitFailed)?;
                    if let Some(descriptor) = watched {
                        self.shared.endpoint.process_incoming(descriptor);
                    }
                }
            }
        }
    }
}

async fn watch(
    endpoint: &dyn ServiceEndpoint,
    descriptor: Option<ServiceDescriptor>,
) -> io::Result<()> {
    match descriptor {
        Some(descriptor) => endpoint.readable(descriptor).await,
        None => std::future::pending().await,
    }
}

impl MonitorShared {
    fn state(&self) -> MonitorState {
        self.status.lock().state
    }

    fn descriptor(&self) -> Option<ServiceDescriptor> {
        self.status.lock().descriptor
    }

    fn begin_recovery(&self) -> RecoveryResult<()> {
        {
            let mut status = self.status.lock();
            match status.state {
                MonitorState::Stopped => return Err(RecoveryError::MonitorStopped),
                MonitorState::Recovering if self.timer.is_running() => {
                    debug!("recovery already in progress");
                    return Ok(());
                }
                _ => {}
            }
            status.descriptor = None;
            status.state = MonitorState::Recovering;
        }

        match self.timer.start() {
            Ok(()) | Err(RecoveryError::AlreadyRunning) => Ok(()),
            Err(e) => {
                error!(error = %e, "failed to start retry timer");
                {
                    let mut status = self.status.lock();
                    if status.state == MonitorState::Recovering {
                        status.state = MonitorState::Idle;
                    }
                }
                self.observer.on_recovery_stalled();
                Err(e)
            }
        }
    }

    fn handle_wakeups(&self, messages: &[WakeupMessage]) {
        let established = messages.contains(&WakeupMessage::ConnectionEstablished);

        if messages.contains(&WakeupMessage::RecoveryAborted) {
            {
                let mut status = self.status.lock();
                if status.state == MonitorState::Recovering && !self.timer.is_running() {
                    status.state = MonitorState::Idle;
                }
            }
            warn!("retry loop aborted before the push service came back");
            self.observer.on_recovery_stalled();
            if !established {
                return;
            }
        }

        self.reevaluate(established);
    }

    fn reevaluate(&self, established: bool) {
        let previous = self.state();
        match previous {
            MonitorState::Stopped => return,
            // Start-of-episode ping: the stale descriptor is already gone.
            MonitorState::Recovering if !established => return,
            _ => {}
        }

        match self.endpoint.current_descriptor() {
            Some(descriptor) => {
                {
                    let mut status = self.status.lock();
                    if status.state == MonitorState::Stopped {
                        return;
                    }
                    status.descriptor = Some(descriptor);
                    status.state = MonitorState::Watching;
                }
                if previous == MonitorState::Recovering || established {
                    info!(%descriptor, "push connection restored");
                    self.observer.on_connection_restored(descriptor);
                } else {
                    debug!(%descriptor, "watch set refreshed");
                }
            }
            None if established || previous == MonitorState::Recovering => {
                warn!("push service lost again before watching resumed");
                // begin_recovery reports failures to the observer itself.
                let _ = self.begin_recovery();
            }
            None => {
                let mut status = self.status.lock();
                if status.state != MonitorState::Stopped {
                    status.descriptor = None;
                    status.state = MonitorState::Idle;
                }
            }
        }
    }

    fn teardown(&self) {
        self.timer.stop();
        let mut status = self.status.lock();
        status.state = MonitorState::Stopped;
        status.descriptor = None;
    }
}

impl MonitorHandle {
    /// Report that the service closed its connection
    ///
    /// Drops the watched descriptor and starts the retry timer. Calling this
    /// again while a recovery is already running does nothing.
    pub fn connection_closed(&self) -> RecoveryResult<()> {
        info!("push service connection closed, starting recovery");
        self.shared.begin_recovery()
    }

    /// Ask the monitor to re-query the service and rebuild its watch set
    pub fn refresh(&self) -> RecoveryResult<()> {
        self.shared
            .wakeup
            .send(WakeupMessage::Ping)
            .map_err(RecoveryError::WakeupFailed)
    }

    pub fn state(&self) -> MonitorState {
        self.shared.state()
    }

    /// Descriptor currently being watched, if any
    pub fn descriptor(&self) -> Option<ServiceDescriptor> {
        self.shared.descriptor()
    }

    /// Whether a retry episode is active
    pub fn is_recovering(&self) -> bool {
        self.shared.timer.is_running()
    }

    /// Producer end of the wakeup pipe for other asynchronous notifiers
    pub fn wakeup_sender(&self) -> WakeupSender {
        self.shared.wakeup.clone()
    }
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.shared.status.lock();
        f.debug_struct("MonitorHandle")
            .field("state", &status.state)
            .field("descriptor", &status.descriptor)
            .finish()
    }
}
