//! Relay board firmware: main entry point.
//!
//! Hexagonal layout, single task, run-to-completion serving.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  OutputBank        LogEventSink   TcpServer      WifiAdapter   │
//! │  (GpioPort)        (EventSink)    (Listener)     (Connectivity)│
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             RelayService (pure logic)                  │    │
//! │  │  RelayBoard · command protocol · line framing          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Watchdog (fed once per poll)                                  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use relayboard::adapters::log_sink::LogEventSink;
use relayboard::adapters::tcp_server::TcpServer;
use relayboard::adapters::wifi::{ConnectivityPort, WifiAdapter};
use relayboard::app::service::{RelayService, ServeTiming};
use relayboard::config::SystemConfig;
use relayboard::drivers::outputs::esp_output_bank;
use relayboard::drivers::watchdog::Watchdog;
use relayboard::error::Error;
use relayboard::relay::RelayBoard;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  RelayBoard v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::load();
    config.validate()?;

    // ── 3. Relay outputs (all released before anything else) ──
    let peripherals = Peripherals::take()?;
    let outputs = esp_output_bank(peripherals.pins, &config.relay_pins).map_err(|e| {
        error!("relay output init failed: {}", e);
        Error::Init("relay output drivers")
    })?;
    let board = RelayBoard::new(config.relay_pins, outputs);
    let mut service = RelayService::new(board, ServeTiming::from(&config));

    // ── 4. WiFi station ───────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let driver = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    let mut wifi = WifiAdapter::new(driver);
    wifi.set_credentials(config.wifi_ssid.as_str(), config.wifi_password.as_str())
        .map_err(Error::from)?;

    info!("Connecting to {}", config.wifi_ssid);
    while let Err(e) = wifi.connect() {
        warn!("WiFi join failed ({}), retrying", e);
        FreeRtos::delay_ms(config.wifi_retry_delay_ms);
    }

    // ── 5. Command listener ───────────────────────────────────
    let mut server = TcpServer::bind(config.listen_port).map_err(Error::from)?;
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let mut log_sink = LogEventSink::new();
    let mut delay = FreeRtos;

    service.start(config.listen_port, &mut log_sink);
    info!("System ready. Entering serve loop.");

    // ── 6. Serve loop ─────────────────────────────────────────
    loop {
        wifi.poll();
        if let Err(e) = service.poll(&mut server, &mut delay, &mut log_sink) {
            warn!("listener error: {}", e);
            FreeRtos::delay_ms(config.accept_poll_ms);
        }
        watchdog.feed();
    }
}
