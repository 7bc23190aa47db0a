//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the `log`
//! facade (UART / USB-CDC via the ESP-IDF logger in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::relay::RelayStatus;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent<'_>) {
        match event {
            AppEvent::Started { port, relays } => {
                info!("START | listening on port {} | {}", port, RelayStatus(relays));
            }
            AppEvent::ClientConnected => info!("CONN  | new client"),
            AppEvent::CommandReceived(token) => info!("CMD   | {}", token),
            AppEvent::RelaysChanged(relays) => info!("RELAY | {}", RelayStatus(relays)),
            AppEvent::RequestServed { request, response } => {
                info!("REQ   | request: {}\nresponse: {}", request, response);
            }
            AppEvent::ClientTimedOut { waited_ms } => {
                warn!("TIMEOUT | no request line after {} ms", waited_ms);
            }
            AppEvent::ClientDropped(e) => warn!("CONN  | dropped: {}", e),
            AppEvent::ClientDisconnected => info!("CONN  | client disconnected"),
        }
    }
}
