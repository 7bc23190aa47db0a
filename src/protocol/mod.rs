//! Text command protocol.
//!
//! A request line is reduced to exactly one [`Command`] or one
//! [`Rejection`].  Commands are applied to the [`RelayBoard`] in full;
//! rejections leave it untouched.  Either way the caller gets a [`Reply`]
//! body, so the protocol never fails.
//!
//! ```text
//! ... set/11110000 ...   bulk set, relay 1 = first digit
//! ... set/13 ...         relay 3 on   (first digit 0/1, second 1..8)
//! ... status ...         read back the 8-digit status string
//! ```
//!
//! The token after `set/` ends at the first space.  Its length selects the
//! form: 8 → bulk, 2 → single relay, anything else falls through to the
//! status check.

pub mod framing;

use core::fmt;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GpioPort};
use crate::relay::encoding::is_binary_digit;
use crate::relay::{PinNumber, RELAY_COUNT, RelayBoard, StatusString};

/// Marker that introduces a set command.
pub const SET_MARKER: &str = "set/";
/// Marker that requests the status string.
pub const STATUS_MARKER: &str = "status";

const BULK_LEN: usize = RELAY_COUNT;
const SINGLE_LEN: usize = 2;

pub const APPLIED: &str = "Valid Request: applied";

/// A syntactically valid request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Eight validated `'0'`/`'1'` digits, relay 1 first.
    SetAll(&'a str),
    /// Switch one relay.
    SetPin { pin: PinNumber, on: bool },
    /// Report the status string.
    Status,
}

/// Why a request was refused.  Never mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Neither `set/` nor `status` present.
    WrongSyntax,
    /// Token has a recognised length but a bad character.
    WrongStatus,
    /// Token length matches no command form.
    WrongSize,
}

impl Rejection {
    pub const fn message(self) -> &'static str {
        match self {
            Self::WrongSyntax => "Invalid Request: wrong syntax",
            Self::WrongStatus => "Invalid Request: wrong status",
            Self::WrongSize => "Invalid Request: wrong size",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Reply body handed back to the transport for framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Applied,
    Status(StatusString),
    Rejected(Rejection),
}

impl Reply {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Applied => APPLIED,
            Self::Status(s) => s.as_str(),
            Self::Rejected(r) => r.message(),
        }
    }
}

/// The text after `set/`, cut at the first space.  `None` without a marker.
pub fn command_token(line: &str) -> Option<&str> {
    let at = line.find(SET_MARKER)?;
    let rest = &line[at + SET_MARKER.len()..];
    Some(rest.split_once(' ').map_or(rest, |(token, _)| token))
}

/// Parse one request line.
pub fn parse(line: &str) -> Result<Command<'_>, Rejection> {
    let line = line.trim();
    let wants_status = line.contains(STATUS_MARKER);

    let Some(token) = command_token(line) else {
        return if wants_status {
            Ok(Command::Status)
        } else {
            Err(Rejection::WrongSyntax)
        };
    };

    match token.len() {
        BULK_LEN => {
            if token.bytes().all(is_binary_digit) {
                Ok(Command::SetAll(token))
            } else {
                Err(Rejection::WrongStatus)
            }
        }
        SINGLE_LEN => {
            let bytes = token.as_bytes();
            match (bytes[0], PinNumber::from_digit(bytes[1])) {
                (state @ (b'0' | b'1'), Some(pin)) => Ok(Command::SetPin {
                    pin,
                    on: state == b'1',
                }),
                _ => Err(Rejection::WrongStatus),
            }
        }
        _ if wants_status => Ok(Command::Status),
        _ => Err(Rejection::WrongSize),
    }
}

/// Parse `line` and apply it to `board`.
///
/// On a successful set the new per-relay status goes to `sink`.  Rejected
/// requests are answered without touching the board.
pub fn handle_request<G: GpioPort>(
    line: &str,
    board: &mut RelayBoard<G>,
    sink: &mut impl EventSink,
) -> Reply {
    if let Some(token) = command_token(line.trim()) {
        sink.emit(&AppEvent::CommandReceived(token));
    }

    match parse(line) {
        Ok(Command::SetAll(bits)) => {
            board.set_from_string(bits);
            sink.emit(&AppEvent::RelaysChanged(board.array_encoding()));
            Reply::Applied
        }
        Ok(Command::SetPin { pin, on }) => {
            board.set_pin(pin, on);
            sink.emit(&AppEvent::RelaysChanged(board.array_encoding()));
            Reply::Applied
        }
        Ok(Command::Status) => Reply::Status(board.string_encoding()),
        Err(rejection) => Reply::Rejected(rejection),
    }
}
