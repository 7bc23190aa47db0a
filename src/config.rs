//! System configuration parameters
//!
//! All tunable parameters for the relay board.  Values are baked in at build
//! time: either a full JSON document in `RELAY_CONFIG_JSON`, or the defaults
//! below with the WiFi credentials taken from `RELAY_WIFI_SSID` and
//! `RELAY_WIFI_PASSWORD`.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins::{DEFAULT_LISTEN_PORT, DEFAULT_RELAY_PINS, MAX_GPIO, RELAY_COUNT};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Network ---
    /// Access point SSID (1-32 printable ASCII bytes)
    pub wifi_ssid: heapless::String<32>,
    /// WPA2 passphrase (8-64 bytes), empty for an open network
    pub wifi_password: heapless::String<64>,
    /// TCP port of the command listener
    pub listen_port: u16,
    /// Delay between join attempts while the station is not yet up (ms)
    pub wifi_retry_delay_ms: u32,

    // --- Relays ---
    /// GPIO per relay slot, relay 1 first
    pub relay_pins: [u8; RELAY_COUNT],

    // --- Timing ---
    /// Sleep between accept polls when no client is waiting (ms)
    pub accept_poll_ms: u32,
    /// Sleep between data polls while waiting for the request line (ms)
    pub data_poll_ms: u32,
    /// Give up on a client that has not sent its request line (ms)
    pub client_timeout_ms: u32,
    /// Task watchdog timeout (ms); must exceed the client timeout
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Network
            wifi_ssid: bounded(option_env!("RELAY_WIFI_SSID").unwrap_or("")),
            wifi_password: bounded(option_env!("RELAY_WIFI_PASSWORD").unwrap_or("")),
            listen_port: DEFAULT_LISTEN_PORT,
            wifi_retry_delay_ms: 500,

            // Relays
            relay_pins: DEFAULT_RELAY_PINS,

            // Timing
            accept_poll_ms: 1,
            data_poll_ms: 1,
            client_timeout_ms: 5_000,
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl SystemConfig {
    /// Build-time configuration, falling back to defaults on a bad document.
    pub fn load() -> Self {
        match option_env!("RELAY_CONFIG_JSON") {
            Some(json) => Self::from_json(json).unwrap_or_else(|e| {
                warn!("RELAY_CONFIG_JSON rejected ({}), using defaults", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Parse a JSON document.  Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|_| Error::Config("malformed configuration JSON"))
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            return Err(Error::Config("listen_port must be non-zero"));
        }
        for (slot, &pin) in self.relay_pins.iter().enumerate() {
            if pin > MAX_GPIO {
                return Err(Error::Config("relay pin is not a valid GPIO"));
            }
            if self.relay_pins[..slot].contains(&pin) {
                return Err(Error::Config("relay pins must be distinct"));
            }
        }
        if self.accept_poll_ms == 0 || self.data_poll_ms == 0 {
            return Err(Error::Config("poll intervals must be non-zero"));
        }
        if self.client_timeout_ms >= self.watchdog_timeout_ms {
            return Err(Error::Config("client timeout must be shorter than the watchdog"));
        }
        Ok(())
    }
}

/// Copy as much of `s` as fits into a fixed-capacity string.
fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
