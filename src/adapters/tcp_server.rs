//! TCP listener adapter.
//!
//! Implements [`Listener`] and [`Transport`] over `std::net`, which ESP-IDF
//! backs with lwIP sockets, so the same code runs on the device and on the
//! host (where the integration tests drive it over loopback).
//!
//! ## Connection model
//!
//! 1. `bind()` opens a non-blocking listener on `0.0.0.0:<port>`.
//! 2. `accept()` polls once; a waiting client comes back as a
//!    [`TcpClient`] whose reads are non-blocking.
//! 3. The first write switches the client socket to blocking mode so the
//!    short response is sent in full.
//! 4. `close()` shuts the socket down in both directions.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};

use log::{info, warn};

use crate::app::ports::{Listener, Transport};
use crate::error::TransportError;

// ───────────────────────────────────────────────────────────────
// Listener
// ───────────────────────────────────────────────────────────────

pub struct TcpServer {
    listener: TcpListener,
}

impl TcpServer {
    /// Listen on all interfaces.
    pub fn bind(port: u16) -> Result<Self, TransportError> {
        Self::bind_addr(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    /// Listen on `addr`.  Port `0` lets the OS pick (see [`local_addr`](Self::local_addr)).
    pub fn bind_addr(addr: SocketAddr) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).map_err(|e| {
            warn!("TCP: bind {} failed: {}", addr, e);
            TransportError::Io
        })?;
        listener
            .set_nonblocking(true)
            .map_err(|_| TransportError::Io)?;
        info!("TCP: listening on {}", addr);
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(|_| TransportError::Io)
    }
}

impl Listener for TcpServer {
    type Client = TcpClient;

    fn accept(&mut self) -> Result<Option<TcpClient>, TransportError> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(true).map_err(|_| TransportError::Io)?;
                info!("TCP: client connected from {}", peer);
                Ok(Some(TcpClient {
                    stream,
                    peer,
                    blocking: false,
                }))
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => {
                warn!("TCP: accept error: {}", e);
                Err(TransportError::Io)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Client connection
// ───────────────────────────────────────────────────────────────

pub struct TcpClient {
    stream: TcpStream,
    peer: SocketAddr,
    blocking: bool,
}

impl Transport for TcpClient {
    fn available(&mut self) -> Result<bool, TransportError> {
        let mut peeked = [0u8; 1];
        match self.stream.peek(&mut peeked) {
            Ok(0) => Err(TransportError::Closed),
            Ok(_) => Ok(true),
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(false),
            Err(_) => Err(TransportError::Io),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.stream.read(buf) {
            Ok(0) => Err(TransportError::Closed),
            Ok(n) => Ok(n),
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(_) => Err(TransportError::Io),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if !self.blocking {
            self.stream
                .set_nonblocking(false)
                .map_err(|_| TransportError::Io)?;
            self.blocking = true;
        }
        self.stream.write_all(data).map_err(|_| TransportError::Io)?;
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.stream.flush().map_err(|_| TransportError::Io)
    }

    fn close(&mut self) {
        // The peer may already be gone; nothing to do about it.
        let _ = self.stream.shutdown(Shutdown::Both);
        info!("TCP: {} disconnected", self.peer);
    }
}
