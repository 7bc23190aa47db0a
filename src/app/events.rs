//! Outbound application events.
//!
//! The domain emits these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters decide what to do with them; in production they become
//! serial log lines.

use crate::error::TransportError;
use crate::relay::RelayBank;

/// Structured diagnostic events emitted by the relay service and protocol.
#[derive(Debug, Clone, Copy)]
pub enum AppEvent<'a> {
    /// The service is ready to accept connections.
    Started { port: u16, relays: &'a RelayBank },

    /// A client connection was accepted.
    ClientConnected,

    /// The command token that followed `set/` in a request.
    CommandReceived(&'a str),

    /// A command was applied; carries the new bank state.
    RelaysChanged(&'a RelayBank),

    /// A request was answered.  `response` is the full envelope sent.
    RequestServed { request: &'a str, response: &'a str },

    /// The client sent no complete request line within the timeout.
    ClientTimedOut { waited_ms: u32 },

    /// The connection failed before a response could be sent.
    ClientDropped(TransportError),

    /// The connection was closed by the server.
    ClientDisconnected,
}
