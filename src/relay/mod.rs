//! Relay state model.
//!
//! The bank of eight relays is the only piece of mutable hardware state in
//! the firmware.  [`RelayBoard`] owns it exclusively; everything else reads
//! one of the three encodings computed from it on demand:
//!
//! | Encoding | Type            | Slot 0 (relay 1) lives at |
//! |----------|-----------------|---------------------------|
//! | array    | [`RelayBank`]   | index 0                   |
//! | byte     | `u8`            | bit 7                     |
//! | string   | [`StatusString`]| character 0               |

pub mod board;
pub mod encoding;

pub use board::RelayBoard;
pub use encoding::{RelayStatus, StatusString};

use crate::error::IndexError;
pub use crate::pins::RELAY_COUNT;

/// A single relay channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relay {
    /// Logical state, `true` = energized.
    pub on: bool,
    /// GPIO driving this channel.  Fixed for the relay's lifetime.
    pub pin_address: u8,
}

impl Relay {
    /// A de-energized relay on `pin_address`.
    pub const fn new(pin_address: u8) -> Self {
        Self {
            on: false,
            pin_address,
        }
    }

    /// Output level for the active-low board: energized drives LOW.
    pub const fn level_high(&self) -> bool {
        !self.on
    }
}

/// The eight relays in slot order.
pub type RelayBank = [Relay; RELAY_COUNT];

/// Build a de-energized bank from a pin map.
pub fn bank_from_pins(pins: [u8; RELAY_COUNT]) -> RelayBank {
    pins.map(Relay::new)
}

/// A validated 1-based relay number as used on the wire (`1..=8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinNumber(u8);

impl PinNumber {
    pub const fn new(pin: u8) -> Result<Self, IndexError> {
        if pin >= 1 && pin as usize <= RELAY_COUNT {
            Ok(Self(pin))
        } else {
            Err(IndexError::Pin(pin))
        }
    }

    /// Parse the ASCII digit `'1'..='8'`.
    pub const fn from_digit(digit: u8) -> Option<Self> {
        if digit.is_ascii_digit() {
            match Self::new(digit - b'0') {
                Ok(pin) => Some(pin),
                Err(_) => None,
            }
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// 0-based slot index for this pin.
    pub const fn slot(self) -> usize {
        self.0 as usize - 1
    }
}

impl TryFrom<u8> for PinNumber {
    type Error = IndexError;

    fn try_from(pin: u8) -> Result<Self, Self::Error> {
        Self::new(pin)
    }
}
