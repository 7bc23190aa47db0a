//! Conversions between the relay bank and its byte / string encodings.
//!
//! Pure functions only; [`RelayBoard`](super::RelayBoard) composes them with
//! the hardware writes.

use core::fmt;

use super::{RelayBank, RELAY_COUNT};

/// Canonical status string: one `'0'`/`'1'` per slot, slot 0 first.
pub type StatusString = heapless::String<RELAY_COUNT>;

/// Bit mask for `slot` in the byte encoding (slot 0 → bit 7).
pub const fn slot_bit(slot: usize) -> u8 {
    1 << (RELAY_COUNT - 1 - slot)
}

pub fn encode_byte(bank: &RelayBank) -> u8 {
    bank.iter()
        .enumerate()
        .filter(|(_, relay)| relay.on)
        .fold(0, |acc, (slot, _)| acc | slot_bit(slot))
}

/// Overwrite the `on` flags of `bank` from `value`; pin addresses are kept.
pub fn decode_byte(value: u8, bank: &mut RelayBank) {
    for (slot, relay) in bank.iter_mut().enumerate() {
        relay.on = value & slot_bit(slot) != 0;
    }
}

pub fn encode_string(bank: &RelayBank) -> StatusString {
    let mut s = StatusString::new();
    for relay in bank {
        // Capacity equals RELAY_COUNT, push cannot fail.
        let _ = s.push(if relay.on { '1' } else { '0' });
    }
    s
}

/// Read `value` as a base-2 numeral into a byte.
///
/// Any character other than `'1'` counts as a `0` digit.  Digits beyond the
/// eighth shift the earliest ones out, as a numeric conversion truncated to
/// eight bits would.
pub fn parse_binary(value: &str) -> u8 {
    value
        .bytes()
        .fold(0u8, |acc, b| (acc << 1) | u8::from(b == b'1'))
}

/// `true` for the two characters accepted in a bulk-set payload.
pub const fn is_binary_digit(b: u8) -> bool {
    matches!(b, b'0' | b'1')
}

/// Human-readable per-relay status line for the diagnostic log.
///
/// `status: 1:ON 2:OFF 3:OFF 4:OFF 5:OFF 6:OFF 7:OFF 8:ON`
pub struct RelayStatus<'a>(pub &'a RelayBank);

impl fmt::Display for RelayStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status:")?;
        for (slot, relay) in self.0.iter().enumerate() {
            write!(f, " {}:{}", slot + 1, if relay.on { "ON" } else { "OFF" })?;
        }
        Ok(())
    }
}
