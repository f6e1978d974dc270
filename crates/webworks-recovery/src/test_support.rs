//! Scripted service endpoint shared by the unit tests

use crate::endpoint::{ServiceDescriptor, ServiceEndpoint};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Notify, mpsc};
use tokio::time::Instant;

/// Answers descriptor queries from a script; `None` once the script runs out
/// unless a steady answer has been set
pub(crate) struct ScriptedEndpoint {
    script: Mutex<VecDeque<Option<ServiceDescriptor>>>,
    steady: Mutex<Option<ServiceDescriptor>>,
    queries: mpsc::UnboundedSender<Instant>,
    panic_on_query: AtomicBool,
    fail_readable: AtomicBool,
    incoming: Notify,
    processed: AtomicUsize,
}

impl ScriptedEndpoint {
    pub(crate) fn new(
        script: impl IntoIterator<Item = Option<ServiceDescriptor>>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Instant>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let endpoint = Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            steady: Mutex::new(None),
            queries: tx,
            panic_on_query: AtomicBool::new(false),
            fail_readable: AtomicBool::new(false),
            incoming: Notify::new(),
            processed: AtomicUsize::new(0),
        });
        (endpoint, rx)
    }

    pub(crate) fn set_steady(&self, descriptor: Option<ServiceDescriptor>) {
        *self.steady.lock() = descriptor;
    }

    pub(crate) fn push(&self, answer: Option<ServiceDescriptor>) {
        self.script.lock().push_back(answer);
    }

    pub(crate) fn panic_on_query(&self) {
        self.panic_on_query.store(true, Ordering::SeqCst);
    }

    /// Make the watched descriptor readable once
    pub(crate) fn deliver(&self) {
        self.incoming.notify_one();
    }

    /// Make every readiness wait fail, as if the descriptor were broken
    pub(crate) fn fail_readable(&self) {
        self.fail_readable.store(true, Ordering::SeqCst);
    }

    pub(crate) fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceEndpoint for ScriptedEndpoint {
    fn current_descriptor(&self) -> Option<ServiceDescriptor> {
        let _ = self.queries.send(Instant::now());
        if self.panic_on_query.load(Ordering::SeqCst) {
            panic!("push service query blew up");
        }
        match self.script.lock().pop_front() {
            Some(answer) => answer,
            None => *self.steady.lock(),
        }
    }

    async fn readable(&self, _descriptor: ServiceDescriptor) -> std::io::Result<()> {
        if self.fail_readable.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("descriptor wait broke"));
        }
        self.incoming.notified().await;
        Ok(())
    }

    fn process_incoming(&self, _descriptor: ServiceDescriptor) {
        self.processed.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn descriptor(fd: i32) -> ServiceDescriptor {
    ServiceDescriptor(fd)
}
