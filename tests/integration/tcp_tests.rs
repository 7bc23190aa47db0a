//! End-to-end tests over real loopback sockets.
//!
//! `TcpServer` and `RelayService` run on the test thread; a plain
//! `std::net::TcpStream` client runs on a second thread.

use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

use crate::mock_hw::{RecordingGpio, RecordingSink};
use relayboard::adapters::tcp_server::TcpServer;
use relayboard::app::service::{PollOutcome, RelayService, ServeTiming};
use relayboard::config::SystemConfig;
use relayboard::pins::DEFAULT_RELAY_PINS;
use relayboard::relay::RelayBoard;

/// Sleeps for real, so the client thread gets a chance to send.
struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

fn request(addr: SocketAddr, line: &'static str) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(line.as_bytes()).unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();
        reply
    })
}

/// Poll until one connection has been handled.
fn serve_one(
    svc: &mut RelayService<RecordingGpio>,
    server: &mut TcpServer,
    sink: &mut RecordingSink,
) -> PollOutcome {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let outcome = svc.poll(server, &mut StdDelay, sink).unwrap();
        if outcome != PollOutcome::Idle {
            return outcome;
        }
        assert!(Instant::now() < deadline, "no client arrived");
    }
}

fn setup() -> (RelayService<RecordingGpio>, TcpServer, SocketAddr) {
    let server = TcpServer::bind_addr(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).unwrap();
    let addr = server.local_addr().unwrap();
    let board = RelayBoard::new(DEFAULT_RELAY_PINS, RecordingGpio::new());
    let svc = RelayService::new(board, ServeTiming::from(&SystemConfig::default()));
    (svc, server, addr)
}

fn body(reply: &str) -> &str {
    let body = reply.split_once("\n\n").map_or("", |(_, b)| b);
    body.strip_suffix('\n').unwrap_or(body)
}

#[test]
fn set_then_status_over_tcp() {
    let (mut svc, mut server, addr) = setup();
    let mut sink = RecordingSink::new();

    let client = request(addr, "GET /set/11110000 HTTP/1.1\r\n");
    assert_eq!(serve_one(&mut svc, &mut server, &mut sink), PollOutcome::Served);
    let reply = client.join().unwrap();
    assert!(reply.starts_with("HTTP/1.1 200 OK\n"));
    assert!(reply.contains("Connection: close\n"));
    assert_eq!(body(&reply), "Valid Request: applied");

    let client = request(addr, "GET /status HTTP/1.1\r\n");
    assert_eq!(serve_one(&mut svc, &mut server, &mut sink), PollOutcome::Served);
    assert_eq!(body(&client.join().unwrap()), "11110000");
    assert_eq!(svc.requests_served(), 2);
}

#[test]
fn rejected_request_over_tcp() {
    let (mut svc, mut server, addr) = setup();
    let mut sink = RecordingSink::new();

    let client = request(addr, "GET /set/99 HTTP/1.1\r\n");
    assert_eq!(serve_one(&mut svc, &mut server, &mut sink), PollOutcome::Served);
    assert_eq!(body(&client.join().unwrap()), "Invalid Request: wrong status");
    assert_eq!(svc.board().byte_encoding(), 0);
}
