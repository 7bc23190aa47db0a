//! Request-line decoder and response envelope.
//!
//! Inbound: bytes up to the first CR (or LF) form the request line.  The
//! receive buffer is 64 bytes including a terminator slot, so at most 63
//! bytes of the line are kept; the rest is read and discarded.
//!
//! Outbound: a minimal HTTP/1.1 envelope around the reply body.
//!
//! ```text
//! HTTP/1.1 200 OK
//! Accept-Ranges: bytes
//! Content-Length: <body bytes>
//! Connection: close
//! Content-Type: text/plain
//!
//! <body>
//! ```
//!
//! Lines are separated by a bare `\n`.

use core::fmt::Write as _;

/// Receive buffer size, terminator slot included.
pub const REQUEST_BUF_SIZE: usize = 64;

/// Longest request line kept.
pub const MAX_LINE_LEN: usize = REQUEST_BUF_SIZE - 1;

/// Room for the envelope plus the longest reply body.
pub const RESPONSE_CAPACITY: usize = 192;

pub type Response = heapless::String<RESPONSE_CAPACITY>;

/// Streaming decoder for one CR-terminated request line.
///
/// A single `Transport::read` may carry part of the line, the whole line,
/// or the line followed by headers; only the first line is kept.
pub struct LineDecoder {
    buf: heapless::Vec<u8, MAX_LINE_LEN>,
    complete: bool,
    truncated: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
            complete: false,
            truncated: false,
        }
    }

    /// Feed bytes.  Returns `true` once the terminator has been seen.
    ///
    /// Bytes after the terminator are ignored, as are any further calls.
    pub fn feed(&mut self, data: &[u8]) -> bool {
        if self.complete {
            return true;
        }
        for &b in data {
            if b == b'\r' || b == b'\n' {
                self.complete = true;
                break;
            }
            if self.buf.push(b).is_err() {
                self.truncated = true;
            }
        }
        self.complete
    }

    /// Mark the line complete without a terminator (peer closed the stream).
    pub fn finish(&mut self) {
        self.complete = true;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Whether bytes past [`MAX_LINE_LEN`] were dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// The collected line.  Invalid UTF-8 is cut at the first bad byte.
    pub fn line(&self) -> &str {
        match core::str::from_utf8(&self.buf) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&self.buf[..e.valid_up_to()]).unwrap_or_default(),
        }
    }

    /// Clear for reuse on the next connection.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.complete = false;
        self.truncated = false;
    }
}

/// Wrap `body` in the response envelope.
///
/// Returns `None` if the result would not fit in [`RESPONSE_CAPACITY`].
pub fn encode_response(body: &str) -> Option<Response> {
    let mut out = Response::new();
    write!(
        out,
        "HTTP/1.1 200 OK\nAccept-Ranges: bytes\nContent-Length: {}\nConnection: close\nContent-Type: text/plain\n\n{}\n",
        body.len(),
        body
    )
    .ok()?;
    Some(out)
}
