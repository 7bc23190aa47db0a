//! The relay board: single owner of the relay bank.
//!
//! Every setter writes the affected outputs through the [`GpioPort`] before
//! returning, so the in-memory bank and the physical pins never diverge.
//! Reads are computed from the bank on demand; there is no cached encoding
//! that could go stale.
//!
//! The board is active-low: an energized relay holds its pin LOW.

use crate::app::ports::GpioPort;
use crate::error::IndexError;

use super::encoding::{self, StatusString};
use super::{PinNumber, RelayBank, RELAY_COUNT, bank_from_pins};

pub struct RelayBoard<G: GpioPort> {
    bank: RelayBank,
    gpio: G,
}

impl<G: GpioPort> RelayBoard<G> {
    /// Take ownership of the outputs and initialise them.
    ///
    /// Every pin is configured as an output and driven HIGH, so all relays
    /// start de-energized.  Because this is the only constructor, the board
    /// cannot be used before initialisation.
    pub fn new(pins: [u8; RELAY_COUNT], gpio: G) -> Self {
        let mut board = Self {
            bank: bank_from_pins(pins),
            gpio,
        };
        board.initialize();
        board
    }

    fn initialize(&mut self) {
        for relay in &self.bank {
            self.gpio.configure_output(relay.pin_address);
            self.gpio.write(relay.pin_address, relay.level_high());
        }
    }

    // ── Reads ─────────────────────────────────────────────────

    pub fn byte_encoding(&self) -> u8 {
        encoding::encode_byte(&self.bank)
    }

    pub fn string_encoding(&self) -> StatusString {
        encoding::encode_string(&self.bank)
    }

    pub fn array_encoding(&self) -> &RelayBank {
        &self.bank
    }

    /// State of the relay in 0-based `slot`.
    pub fn pin(&self, slot: usize) -> Result<bool, IndexError> {
        self.bank
            .get(slot)
            .map(|relay| relay.on)
            .ok_or(IndexError::Slot(slot))
    }

    // ── Writes ────────────────────────────────────────────────

    /// Replace the whole bank and drive all eight outputs.
    pub fn set_all(&mut self, bank: RelayBank) {
        self.bank = bank;
        for slot in 0..RELAY_COUNT {
            self.drive(slot);
        }
    }

    /// Bit 7 → relay 1 … bit 0 → relay 8.
    pub fn set_from_byte(&mut self, value: u8) {
        let mut bank = self.bank;
        encoding::decode_byte(value, &mut bank);
        self.set_all(bank);
    }

    /// Apply an 8-digit binary string, first character → relay 1.
    ///
    /// The string is not validated here; see [`encoding::parse_binary`] for
    /// how non-binary characters are read.
    pub fn set_from_string(&mut self, value: &str) {
        self.set_from_byte(encoding::parse_binary(value));
    }

    /// Set a single relay by its 1-based number.
    pub fn set_single_pin(&mut self, pin: u8, on: bool) -> Result<(), IndexError> {
        let pin = PinNumber::new(pin)?;
        self.set_pin(pin, on);
        Ok(())
    }

    /// Infallible form of [`set_single_pin`](Self::set_single_pin) for an
    /// already-validated pin number.
    pub fn set_pin(&mut self, pin: PinNumber, on: bool) {
        let slot = pin.slot();
        self.bank[slot].on = on;
        self.drive(slot);
    }

    /// Borrow the output driver (inspection in tests and adapters).
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    fn drive(&mut self, slot: usize) {
        let relay = self.bank[slot];
        self.gpio.write(relay.pin_address, relay.level_high());
    }
}
