//! Self-pipe used to rewake the connection monitor

use crate::error::{RecoveryError, RecoveryResult};
use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::net::unix::pipe;

/// Single-byte messages carried by the wakeup pipe
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeupMessage {
    /// Re-evaluate the watch set; the current descriptor may be stale
    Ping = 0x01,
    /// The retry timer found a live service descriptor
    ConnectionEstablished = 0x02,
    /// The retry loop died without reaching the service
    RecoveryAborted = 0x03,
}

impl WakeupMessage {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(WakeupMessage::Ping),
            0x02 => Some(WakeupMessage::ConnectionEstablished),
            0x03 => Some(WakeupMessage::RecoveryAborted),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Create the wakeup pipe
///
/// The read end is registered with the current Tokio reactor, so this must be
/// called from within a runtime context. The write end is detached from the
/// reactor and written directly, so a send never depends on readiness the
/// reactor has not observed yet.
pub fn wakeup_pipe() -> RecoveryResult<(WakeupSender, WakeupReceiver)> {
    let (sender, receiver) = pipe::pipe().map_err(RecoveryError::PipeCreation)?;
    let fd = sender
        .into_nonblocking_fd()
        .map_err(RecoveryError::PipeCreation)?;
    Ok((
        WakeupSender {
            inner: Arc::new(File::from(fd)),
        },
        WakeupReceiver { inner: receiver },
    ))
}

/// Write end of the wakeup pipe, shared by every producer
///
/// Writes never block. Single-byte writes to a pipe are atomic, so clones
/// can send concurrently without extra locking.
#[derive(Clone, Debug)]
pub struct WakeupSender {
    inner: Arc<File>,
}

impl WakeupSender {
    /// Write one message; a full or closed pipe is reported, never waited on
    pub fn send(&self, message: WakeupMessage) -> io::Result<()> {
        loop {
            match (&*self.inner).write(&[message.as_byte()]) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(_) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Read end of the wakeup pipe, owned by the connection monitor
#[derive(Debug)]
pub struct WakeupReceiver {
    inner: pipe::Receiver,
}

impl WakeupReceiver {
    /// Wait until at least one byte may be read
    pub async fn readable(&self) -> io::Result<()> {
        self.inner.readable().await
    }

    /// Read every queued message without blocking
    ///
    /// Unknown bytes are logged and skipped. Returns [`RecoveryError::PipeClosed`]
    /// once every sender is gone and nothing is left to read.
    pub fn drain(&mut self) -> RecoveryResult<Vec<WakeupMessage>> {
        let mut buf = [0u8; 64];
        let mut messages = Vec::new();

        loop {
            match self.inner.try_read(&mut buf) {
                Ok(0) if messages.is_empty() => return Err(RecoveryError::PipeClosed),
                Ok(0) => break,
                Ok(n) => {
                    for &byte in &buf[..n] {
                        match WakeupMessage::from_byte(byte) {
                            Some(message) => messages.push(message),
                            None => tracing::warn!(byte, "ignoring unknown wakeup byte"),
                        }
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(RecoveryError::WaitFailed(e)),
            }
        }

        Ok(messages)
    }

    /// Wait for and return the next non-empty batch of messages
    pub async fn recv(&mut self) -> RecoveryResult<Vec<WakeupMessage>> {
        loop {
            self.readable().await.map_err(RecoveryError::WaitFailed)?;
            let messages = self.drain()?;
            if !messages.is_empty() {
                return Ok(messages);
            }
        }
    }
}

#[cfg(test)]
#[path = "wakeup/wakeup_tests.rs"]
mod wakeup_tests;
