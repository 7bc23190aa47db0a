//! Relay service: the hexagonal core.
//!
//! [`RelayService`] owns the [`RelayBoard`] and services one connection at
//! a time, run to completion:
//!
//! ```text
//!  Listener ──▶ accept ──▶ wait for data ──▶ read line ──▶ protocol
//!                                                           │
//!  Transport ◀── close ◀── write response ◀─────────────────┘
//! ```
//!
//! There is no concurrency: the board is only ever touched from inside
//! [`RelayService::poll`].  The two waits (for a connection, for client
//! data) are fixed-interval spin-waits through [`DelayNs`]; the data wait
//! gives up after `client_timeout_ms`.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::config::SystemConfig;
use crate::error::TransportError;
use crate::protocol::{self, framing};
use crate::relay::RelayBoard;

use super::events::AppEvent;
use super::ports::{EventSink, GpioPort, Listener, Transport, write_all};

const READ_CHUNK: usize = framing::REQUEST_BUF_SIZE;

/// What one call to [`RelayService::poll`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No client was waiting.
    Idle,
    /// A request was read and answered.
    Served,
    /// The client sent nothing usable before the timeout.
    TimedOut,
    /// The connection failed mid-request.
    Dropped(TransportError),
}

/// Wait intervals for the serve loop, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeTiming {
    pub accept_poll_ms: u32,
    pub data_poll_ms: u32,
    pub client_timeout_ms: u32,
}

impl From<&SystemConfig> for ServeTiming {
    fn from(config: &SystemConfig) -> Self {
        Self {
            accept_poll_ms: config.accept_poll_ms,
            data_poll_ms: config.data_poll_ms,
            client_timeout_ms: config.client_timeout_ms,
        }
    }
}

/// The application service.
pub struct RelayService<G: GpioPort> {
    board: RelayBoard<G>,
    timing: ServeTiming,
    requests_served: u32,
}

impl<G: GpioPort> RelayService<G> {
    pub fn new(board: RelayBoard<G>, timing: ServeTiming) -> Self {
        Self {
            board,
            timing,
            requests_served: 0,
        }
    }

    /// Announce readiness on `port`.
    pub fn start(&self, port: u16, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            port,
            relays: self.board.array_encoding(),
        });
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Accept at most one connection and service it completely.
    ///
    /// With no pending client this sleeps `accept_poll_ms` and returns
    /// [`PollOutcome::Idle`].  Only a failing listener is an error; per-client
    /// failures are reported in the outcome and through `sink`.
    pub fn poll<L: Listener>(
        &mut self,
        listener: &mut L,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> Result<PollOutcome, TransportError> {
        let Some(mut client) = listener.accept()? else {
            delay.delay_ms(self.timing.accept_poll_ms);
            return Ok(PollOutcome::Idle);
        };

        sink.emit(&AppEvent::ClientConnected);
        let outcome = self.serve(&mut client, delay, sink);
        client.close();
        sink.emit(&AppEvent::ClientDisconnected);

        if outcome == PollOutcome::Served {
            self.requests_served = self.requests_served.wrapping_add(1);
        }
        Ok(outcome)
    }

    fn serve(
        &mut self,
        client: &mut impl Transport,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> PollOutcome {
        let mut decoder = framing::LineDecoder::new();
        let mut chunk = [0u8; READ_CHUNK];
        let mut waited_ms: u32 = 0;

        while !decoder.is_complete() {
            match client.available() {
                Ok(true) => match client.read(&mut chunk) {
                    Ok(n) => {
                        decoder.feed(&chunk[..n]);
                    }
                    Err(e) => return dropped(e, sink),
                },
                Ok(false) => {
                    if waited_ms >= self.timing.client_timeout_ms {
                        sink.emit(&AppEvent::ClientTimedOut { waited_ms });
                        return PollOutcome::TimedOut;
                    }
                    delay.delay_ms(self.timing.data_poll_ms);
                    waited_ms = waited_ms.saturating_add(self.timing.data_poll_ms);
                }
                // Peer sent a line without a terminator and hung up.
                Err(TransportError::Closed) if !decoder.is_empty() => decoder.finish(),
                Err(e) => return dropped(e, sink),
            }
        }

        if decoder.is_truncated() {
            debug!("request line truncated to {} bytes", framing::MAX_LINE_LEN);
        }

        let request = decoder.line();
        let reply = protocol::handle_request(request, &mut self.board, sink);
        let Some(response) = framing::encode_response(reply.as_str()) else {
            warn!("reply body does not fit the response buffer");
            return PollOutcome::Dropped(TransportError::Io);
        };

        if let Err(e) = write_all(client, response.as_bytes()).and_then(|()| client.flush()) {
            return dropped(e, sink);
        }

        sink.emit(&AppEvent::RequestServed {
            request,
            response: response.as_str(),
        });
        PollOutcome::Served
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn board(&self) -> &RelayBoard<G> {
        &self.board
    }

    /// Requests answered since startup.
    pub fn requests_served(&self) -> u32 {
        self.requests_served
    }
}

fn dropped(e: TransportError, sink: &mut impl EventSink) -> PollOutcome {
    sink.emit(&AppEvent::ClientDropped(e));
    PollOutcome::Dropped(e)
}
