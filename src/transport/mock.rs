//! Channel-driven transport for tests and hardware-free development

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::mpsc;

use super::LineTransport;

enum MockIo {
    Line(String),
    Error(std::io::Error),
}

/// A [`LineTransport`] fed from a [`MockHandle`] instead of hardware.
///
/// Lines and injected errors are delivered in push order. Dropping or
/// closing the handle ends the stream, which a session treats like a device
/// disconnecting cleanly.
pub struct MockTransport {
    incoming: mpsc::UnboundedReceiver<MockIo>,
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

/// Control handle for a [`MockTransport`].
pub struct MockHandle {
    tx: Option<mpsc::UnboundedSender<MockIo>>,
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockTransport {
    /// Create a transport and the handle that feeds it.
    pub fn new() -> (MockTransport, MockHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let writes = Arc::new(Mutex::new(Vec::new()));
        let fail_writes = Arc::new(AtomicBool::new(false));

        let transport = MockTransport {
            incoming: rx,
            writes: Arc::clone(&writes),
            fail_writes: Arc::clone(&fail_writes),
        };
        let handle = MockHandle { tx: Some(tx), writes, fail_writes };
        (transport, handle)
    }
}

impl MockHandle {
    /// Queue one raw device line. Returns false once the transport is gone.
    pub fn push_line(&self, line: &str) -> bool {
        match &self.tx {
            Some(tx) => tx.send(MockIo::Line(line.to_string())).is_ok(),
            None => false,
        }
    }

    /// Queue a communication error the transport will surface on read.
    pub fn push_error(&self, error: std::io::Error) -> bool {
        match &self.tx {
            Some(tx) => tx.send(MockIo::Error(error)).is_ok(),
            None => false,
        }
    }

    /// End the stream after the already-queued items are delivered.
    pub fn close(&mut self) {
        self.tx = None;
    }

    /// Make subsequent command writes fail, for init-policy tests.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every command written to the transport so far, in write order.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LineTransport for MockTransport {
    async fn write_command(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("mock write failure"));
        }
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(bytes.to_vec());
        }
        Ok(())
    }

    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        match self.incoming.recv().await {
            Some(MockIo::Line(line)) => Ok(Some(line)),
            Some(MockIo::Error(e)) => Err(e),
            None => Ok(None),
        }
    }
}
