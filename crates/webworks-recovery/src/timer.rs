//! Exponential backoff retry timer

use crate::backoff::Backoff;
use crate::endpoint::ServiceEndpoint;
use crate::error::{RecoveryError, RecoveryResult};
use crate::wakeup::{WakeupMessage, WakeupSender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, warn};

/// Polls the service with growing intervals until it has a live descriptor
///
/// Each [`RetryTimer::start`] opens a new episode. A loop only acts while its
/// episode is the current one, so a stop followed quickly by a start can never
/// leave two loops querying the service or signalling the monitor.
pub struct RetryTimer {
    shared: Arc<Mutex<RetryState>>,
    endpoint: Arc<dyn ServiceEndpoint>,
    wakeup: WakeupSender,
    runtime: Option<Handle>,
}

#[derive(Debug)]
struct RetryState {
    backoff: Backoff,
    running: bool,
    episode: u64,
    interrupt: Option<Arc<Notify>>,
}

impl RetryState {
    fn is_current(&self, episode: u64) -> bool {
        self.running && self.episode == episode
    }

    fn finish(&mut self) {
        self.running = false;
        self.backoff.reset();
        self.interrupt = None;
    }
}

impl RetryTimer {
    /// Create a stopped timer
    ///
    /// Loops are spawned on the runtime current at construction, or on the
    /// one current at [`RetryTimer::start`] if there was none.
    pub fn new(endpoint: Arc<dyn ServiceEndpoint>, wakeup: WakeupSender, backoff: Backoff) -> Self {
        Self {
            shared: Arc::new(Mutex::new(RetryState {
                backoff,
                running: false,
                episode: 0,
                interrupt: None,
            })),
            endpoint,
            wakeup,
            runtime: Handle::try_current().ok(),
        }
    }

    /// Begin a recovery episode
    ///
    /// Writes an immediate [`WakeupMessage::Ping`] so the monitor drops its
    /// stale descriptor, then launches the loop. If no runtime is reachable
    /// the timer is left stopped and [`RecoveryError::SpawnFailed`] returned.
    pub fn start(&self) -> RecoveryResult<()> {
        if self.shared.lock().running {
            return Err(RecoveryError::AlreadyRunning);
        }

        if let Err(e) = self.wakeup.send(WakeupMessage::Ping) {
            warn!(error = %e, "failed to write wakeup ping");
        }

        let interrupt = Arc::new(Notify::new());
        let episode = {
            let mut state = self.shared.lock();
            if state.running {
                return Err(RecoveryError::AlreadyRunning);
            }
            state.running = true;
            state.episode += 1;
            state.backoff.reset();
            state.interrupt = Some(interrupt.clone());
            state.episode
        };

        let Some(handle) = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
        else {
            self.shared.lock().finish();
            error!(episode, "no runtime available for retry loop");
            return Err(RecoveryError::SpawnFailed(
                "no Tokio runtime available".to_string(),
            ));
        };

        let retry_loop = handle.spawn(retry_loop(
            self.shared.clone(),
            self.endpoint.clone(),
            self.wakeup.clone(),
            episode,
            interrupt,
        ));

        let shared = self.shared.clone();
        let wakeup = self.wakeup.clone();
        handle.spawn(async move {
            let Err(join_error) = retry_loop.await else {
                return;
            };
            if !join_error.is_panic() {
                return;
            }
            {
                let mut state = shared.lock();
                if state.episode != episode {
                    return;
                }
                state.finish();
            }
            error!(episode, "retry loop panicked, recovery aborted");
            if let Err(e) = wakeup.send(WakeupMessage::RecoveryAborted) {
                warn!(error = %e, "failed to report aborted recovery");
            }
        });

        info!(episode, "retry timer started");
        Ok(())
    }

    /// End the current episode without waiting for its loop
    ///
    /// Safe to call when already stopped. The backoff returns to its initial
    /// interval.
    pub fn stop(&self) {
        let interrupt = {
            let mut state = self.shared.lock();
            let was_running = state.running;
            let interrupt = state.interrupt.take();
            state.finish();
            if was_running {
                debug!(episode = state.episode, "retry timer stopped");
            }
            interrupt
        };

        if let Some(interrupt) = interrupt {
            interrupt.notify_one();
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Interval the next wait of the current episode will use
    pub fn current_interval(&self) -> Duration {
        self.shared.lock().backoff.current()
    }
}

impl Drop for RetryTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for RetryTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("RetryTimer")
            .field("running", &state.running)
            .field("episode", &state.episode)
            .field("current_interval", &state.backoff.current())
            .finish()
    }
}

async fn retry_loop(
    shared: Arc<Mutex<RetryState>>,
    endpoint: Arc<dyn ServiceEndpoint>,
    wakeup: WakeupSender,
    episode: u64,
    interrupt: Arc<Notify>,
) {
    loop {
        let interval = {
            let mut state = shared.lock();
            if !state.is_current(episode) {
                return;
            }
            state.backoff.advance()
        };

        debug!(
            episode,
            retry_secs = interval.as_secs(),
            "waiting before next connection check"
        );

        let deadline = deadline_after(interval);
        tokio::select! {
            _ = sleep_until(deadline) => {}
            _ = interrupt.notified() => return,
        }

        if !shared.lock().is_current(episode) {
            return;
        }

        let Some(descriptor) = endpoint.current_descriptor() else {
            debug!(episode, "push service still unavailable");
            continue;
        };

        {
            let mut state = shared.lock();
            if !state.is_current(episode) {
                return;
            }
            state.finish();
        }

        info!(episode, %descriptor, "push service reachable again");
        if let Err(e) = wakeup.send(WakeupMessage::ConnectionEstablished) {
            warn!(error = %e, "failed to signal established connection");
        }
        return;
    }
}

fn deadline_after(interval: Duration) -> Instant {
    let now = Instant::now();
    // Roughly thirty years, which is what Tokio treats as "never" too.
    now.checked_add(interval)
        .unwrap_or_else(|| now + Duration::from_secs(86400 * 365 * 30))
}
