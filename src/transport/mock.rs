//! Scripted in-memory transport for protocol tests.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;
use crate::transport::Transport;

type Responder = Box<dyn FnMut(&[u8]) -> Vec<u8> + Send>;

/// Device simulator: every write is recorded and answered by the responder.
pub(crate) struct MockTransport {
    responder: Responder,
    written: Vec<Bytes>,
    pending: VecDeque<Bytes>,
    chunk_size: usize,
    connected: bool,
}

impl MockTransport {
    pub(crate) fn new(responder: impl FnMut(&[u8]) -> Vec<u8> + Send + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            written: Vec::new(),
            pending: VecDeque::new(),
            chunk_size: usize::MAX,
            connected: true,
        }
    }

    /// Answers every command with the same bytes.
    pub(crate) fn replying(reply: &'static [u8]) -> Self {
        Self::new(move |_| reply.to_vec())
    }

    /// Delivers replies in pieces of at most `size` bytes.
    pub(crate) fn chunked(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub(crate) fn written(&self) -> &[Bytes] {
        &self.written
    }
}

impl Transport for MockTransport {
    fn connect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.connected = true;
            Ok(())
        })
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.connected = false;
            Ok(())
        })
    }

    fn send(&mut self, data: Bytes) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + '_>> {
        Box::pin(async move {
            let reply = (self.responder)(&data);
            for chunk in reply.chunks(self.chunk_size) {
                self.pending.push_back(Bytes::copy_from_slice(chunk));
            }
            let len = data.len();
            self.written.push(data);
            Ok(len)
        })
    }

    fn read_available(
        &mut self,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move { Ok(self.pending.pop_front().unwrap_or_default()) })
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Installs a test log subscriber honouring `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
