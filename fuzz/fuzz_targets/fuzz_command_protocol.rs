//! Fuzz target: request line decoding and command handling
//!
//! Drives arbitrary byte sequences through `LineDecoder` and
//! `protocol::handle_request` and asserts that nothing panics, that the
//! board only changes when a command is applied, and that every reply
//! fits the response envelope.
//!
//! cargo fuzz run fuzz_command_protocol

#![no_main]

use libfuzzer_sys::fuzz_target;
use relayboard::app::events::AppEvent;
use relayboard::app::ports::{EventSink, GpioPort};
use relayboard::pins::DEFAULT_RELAY_PINS;
use relayboard::protocol::framing::{LineDecoder, MAX_LINE_LEN, encode_response};
use relayboard::protocol::{self, Reply};
use relayboard::relay::RelayBoard;

struct NullGpio;

impl GpioPort for NullGpio {
    fn configure_output(&mut self, _pin: u8) {}
    fn write(&mut self, _pin: u8, _high: bool) {}
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent<'_>) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&start, rest)) = data.split_first() else {
        return;
    };

    let mut board = RelayBoard::new(DEFAULT_RELAY_PINS, NullGpio);
    board.set_from_byte(start);

    // Feed in two halves to exercise segment boundaries.
    let mut decoder = LineDecoder::new();
    let (a, b) = rest.split_at(rest.len() / 2);
    decoder.feed(a);
    decoder.feed(b);
    decoder.finish();
    assert!(decoder.line().len() <= MAX_LINE_LEN);

    let reply = protocol::handle_request(decoder.line(), &mut board, &mut NullSink);
    if reply != Reply::Applied {
        assert_eq!(board.byte_encoding(), start, "board mutated by a non-applied request");
    }
    assert!(encode_response(reply.as_str()).is_some(), "reply overflowed the envelope");
});
