//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RelayService / RelayBoard (domain)
//! ```
//!
//! Driven adapters (GPIO, sockets, event sinks) implement these traits.  The
//! domain consumes them via generics, so the relay model and the command
//! protocol never touch hardware or sockets directly.

use crate::error::TransportError;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain → relay outputs)
// ───────────────────────────────────────────────────────────────

/// Digital outputs addressed by GPIO number.
///
/// Writes are synchronous and assumed infallible; an adapter that can fail
/// logs the failure instead of surfacing it.
pub trait GpioPort {
    /// Configure `pin` as a push-pull digital output.
    fn configure_output(&mut self, pin: u8);

    /// Drive `pin` HIGH (`true`) or LOW (`false`).
    fn write(&mut self, pin: u8, high: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → diagnostic log)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget diagnostic output.  No backpressure.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent<'_>);
}

// ───────────────────────────────────────────────────────────────
// Network ports (driven adapter: sockets → domain)
// ───────────────────────────────────────────────────────────────

/// One accepted client connection.
pub trait Transport {
    /// Whether unread bytes are waiting.  Never blocks.
    ///
    /// Returns [`TransportError::Closed`] once the peer has hung up and no
    /// data remains.
    fn available(&mut self) -> Result<bool, TransportError>;

    /// Read up to `buf.len()` bytes.  Returns 0 if nothing is available.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write `data`, returning the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), TransportError>;

    /// Close the connection from the server side.
    fn close(&mut self);
}

/// Source of inbound connections.
pub trait Listener {
    type Client: Transport;

    /// Poll for the next pending connection.  `Ok(None)` if nobody is waiting.
    fn accept(&mut self) -> Result<Option<Self::Client>, TransportError>;
}

/// Write all of `data`, retrying short writes.
pub fn write_all(transport: &mut impl Transport, mut data: &[u8]) -> Result<(), TransportError> {
    while !data.is_empty() {
        match transport.write(data)? {
            0 => return Err(TransportError::Closed),
            n => data = &data[n..],
        }
    }
    Ok(())
}
