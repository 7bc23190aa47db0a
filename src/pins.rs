//! GPIO assignments for the eight-channel relay board.
//!
//! Single source of truth for the default wiring.  The order is the slot
//! order: entry 0 drives relay 1, entry 7 drives relay 8.  A deployment
//! can remap the channels through `SystemConfig::relay_pins`.

/// Number of relay channels on the board.  Fixed by the hardware.
pub const RELAY_COUNT: usize = 8;

/// Default GPIO per relay slot (relay 1 … relay 8).
///
/// Matches the NodeMCU-style header labelling D1, D2, D3, D4, D5, D6, D7, D0.
pub const DEFAULT_RELAY_PINS: [u8; RELAY_COUNT] = [5, 4, 0, 2, 14, 12, 13, 16];

/// Highest output-capable GPIO on the ESP32 (34-39 are input-only).
pub const MAX_GPIO: u8 = 33;

/// Default TCP port for the command listener.
pub const DEFAULT_LISTEN_PORT: u16 = 80;
