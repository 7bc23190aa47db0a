//! Mock hardware and network adapters for integration tests.
//!
//! Records every GPIO write, every byte sent to a client, and every
//! application event so tests can assert on the full history without
//! touching real pins or sockets.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use relayboard::app::events::AppEvent;
use relayboard::app::ports::{EventSink, GpioPort, Listener, Transport};
use relayboard::error::TransportError;
use relayboard::relay::encoding::encode_byte;

// ── GPIO ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingGpio {
    pub outputs: Vec<u8>,
    pub levels: HashMap<u8, bool>,
    pub writes: Vec<(u8, bool)>,
}

#[allow(dead_code)]
impl RecordingGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level last driven on `pin`, if any.
    pub fn level(&self, pin: u8) -> Option<bool> {
        self.levels.get(&pin).copied()
    }
}

impl GpioPort for RecordingGpio {
    fn configure_output(&mut self, pin: u8) {
        self.outputs.push(pin);
    }

    fn write(&mut self, pin: u8, high: bool) {
        self.levels.insert(pin, high);
        self.writes.push((pin, high));
    }
}

// ── Client connection ─────────────────────────────────────────

/// One scripted step of client behaviour, consumed by `available()`.
#[derive(Debug, Clone)]
pub enum Step {
    /// Bytes that become readable.
    Bytes(Vec<u8>),
    /// One poll with nothing to read.
    Silence,
    /// The peer hung up; reported on every poll from here on.
    Hangup,
    /// The socket failed.
    Fault,
}

/// What the server did to the connection, shared with the test body.
#[derive(Debug, Default)]
pub struct Wire {
    pub sent: Vec<u8>,
    pub closed: bool,
    pub flushes: u32,
}

#[allow(dead_code)]
impl Wire {
    pub fn sent_text(&self) -> String {
        String::from_utf8_lossy(&self.sent).into_owned()
    }

    /// Response body: everything after the blank line, minus the final `\n`.
    pub fn body(&self) -> String {
        let text = self.sent_text();
        let body = text.split_once("\n\n").map_or("", |(_, b)| b);
        body.strip_suffix('\n').unwrap_or(body).to_string()
    }
}

pub struct ScriptedClient {
    steps: VecDeque<Step>,
    wire: Rc<RefCell<Wire>>,
    fail_writes: bool,
    max_write: usize,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> (Self, Rc<RefCell<Wire>>) {
        let wire = Rc::new(RefCell::new(Wire::default()));
        (
            Self {
                steps: steps.into_iter().collect(),
                wire: Rc::clone(&wire),
                fail_writes: false,
                max_write: usize::MAX,
            },
            wire,
        )
    }

    /// A client that sends `line` in a single segment.
    pub fn sending(line: &str) -> (Self, Rc<RefCell<Wire>>) {
        Self::new([Step::Bytes(line.as_bytes().to_vec())])
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Accept at most `n` bytes per `write` call.
    pub fn short_writes(mut self, n: usize) -> Self {
        self.max_write = n;
        self
    }
}

impl Transport for ScriptedClient {
    fn available(&mut self) -> Result<bool, TransportError> {
        match self.steps.front() {
            Some(Step::Bytes(_)) => Ok(true),
            Some(Step::Silence) => {
                self.steps.pop_front();
                Ok(false)
            }
            Some(Step::Hangup) => Err(TransportError::Closed),
            Some(Step::Fault) => Err(TransportError::Io),
            None => Ok(false),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let Some(Step::Bytes(data)) = self.steps.front_mut() else {
            return Ok(0);
        };
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        data.drain(..n);
        if data.is_empty() {
            self.steps.pop_front();
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if self.fail_writes {
            return Err(TransportError::Io);
        }
        let n = data.len().min(self.max_write);
        self.wire.borrow_mut().sent.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.wire.borrow_mut().flushes += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.wire.borrow_mut().closed = true;
    }
}

// ── Listener ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockListener {
    pending: VecDeque<ScriptedClient>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, client: ScriptedClient) {
        self.pending.push_back(client);
    }
}

impl Listener for MockListener {
    type Client = ScriptedClient;

    fn accept(&mut self) -> Result<Option<ScriptedClient>, TransportError> {
        if self.fail {
            return Err(TransportError::Io);
        }
        Ok(self.pending.pop_front())
    }
}

// ── Event sink ────────────────────────────────────────────────

/// Owned copy of an [`AppEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Started { port: u16, relays: u8 },
    Connected,
    Command(String),
    RelaysChanged(u8),
    Served { request: String, response: String },
    TimedOut(u32),
    Dropped(TransportError),
    Disconnected,
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<Recorded>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn relay_changes(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Recorded::RelaysChanged(b) => Some(*b),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent<'_>) {
        let recorded = match event {
            AppEvent::Started { port, relays } => Recorded::Started {
                port: *port,
                relays: encode_byte(relays),
            },
            AppEvent::ClientConnected => Recorded::Connected,
            AppEvent::CommandReceived(token) => Recorded::Command((*token).to_string()),
            AppEvent::RelaysChanged(relays) => Recorded::RelaysChanged(encode_byte(relays)),
            AppEvent::RequestServed { request, response } => Recorded::Served {
                request: (*request).to_string(),
                response: (*response).to_string(),
            },
            AppEvent::ClientTimedOut { waited_ms } => Recorded::TimedOut(*waited_ms),
            AppEvent::ClientDropped(e) => Recorded::Dropped(*e),
            AppEvent::ClientDisconnected => Recorded::Disconnected,
        };
        self.events.push(recorded);
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Accumulates requested delay instead of sleeping.
#[derive(Default)]
pub struct CountingDelay {
    pub total_ns: u64,
    pub calls: u32,
}

#[allow(dead_code)]
impl CountingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.calls += 1;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += u64::from(ms) * 1_000_000;
        self.calls += 1;
    }
}
