//! Test helpers shared by the varnish and handler integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::Arc;

use invalidator_varnish::{InvalidationRequest, Transport, TransportError, TransportResponse};
use parking_lot::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// What the fake proxy does with every request.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Answer with a status and optional body.
    Respond(u16, Option<&'static str>),
    /// Fail as if the proxy were unreachable.
    Refuse,
}

/// Transport that records requests instead of sending them.
#[derive(Debug)]
pub struct RecordingTransport {
    outcome: Outcome,
    requests: Mutex<Vec<InvalidationRequest>>,
}

impl RecordingTransport {
    pub fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::new(Outcome::Respond(200, Some("Ban added")))
    }

    pub fn requests(&self) -> Vec<InvalidationRequest> {
        self.requests.lock().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &InvalidationRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().push(request.clone());
        match &self.outcome {
            Outcome::Respond(status, body) => Ok(TransportResponse {
                status: *status,
                body: body.map(str::to_string),
            }),
            Outcome::Refuse => Err(TransportError::connection("connection refused")),
        }
    }
}

/// In-memory sink for formatted log lines.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Lines logged at `level` (`ERROR`, `WARN`, ...).
    pub fn lines_at(&self, level: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.split_whitespace().next() == Some(level))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Runs `f` with a DEBUG-level subscriber writing into a fresh buffer.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, LogBuffer) {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}
