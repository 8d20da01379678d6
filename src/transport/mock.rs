//! In-memory transport for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{Transport, TransportError};

/// A scriptable transport backed by in-memory queues.
///
/// Tests queue server lines with [`queue_read`](Self::queue_read) and
/// inspect everything the engine wrote with
/// [`written_lines`](Self::written_lines). `read_line` suspends while the
/// incoming queue is empty rather than reporting end of stream; call
/// [`queue_eof`](Self::queue_eof) to simulate the server closing the
/// connection.
#[derive(Default)]
pub struct MockTransport {
    incoming: Mutex<VecDeque<String>>,
    written: Mutex<Vec<String>>,
    eof: AtomicBool,
    closed: AtomicBool,
    notify: Notify,
}

impl MockTransport {
    /// Create an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning carries no risk here (the guarded data is plain queues),
    // so recover the guard rather than propagating a panic.
    fn incoming(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.incoming.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn written(&self) -> MutexGuard<'_, Vec<String>> {
        self.written.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue one server line for the engine to read.
    pub fn queue_read(&self, line: impl Into<String>) {
        self.incoming().push_back(line.into());
        self.notify.notify_one();
    }

    /// After the queued lines drain, `read_line` reports end of stream.
    pub fn queue_eof(&self) {
        self.eof.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Lines the engine has written so far, in order, without CRLF.
    pub fn written_lines(&self) -> Vec<String> {
        self.written().clone()
    }

    /// Number of lines written so far.
    pub fn written_len(&self) -> usize {
        self.written().len()
    }

    /// Drain and return the written lines.
    pub fn take_written(&self) -> Vec<String> {
        std::mem::take(&mut *self.written())
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn read_line(&self) -> Result<Option<String>, TransportError> {
        loop {
            // Arm the wakeup before checking state so a queue_read between
            // the check and the await is not lost.
            let notified = self.notify.notified();
            {
                let mut queue = self.incoming();
                if let Some(line) = queue.pop_front() {
                    self.notify.notify_one();
                    return Ok(Some(line));
                }
                if self.eof.load(Ordering::SeqCst) || self.closed.load(Ordering::SeqCst) {
                    return Ok(None);
                }
            }
            notified.await;
        }
    }

    async fn write_line(&self, line: &str) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        self.written().push(trimmed.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
        Ok(())
    }
}
