//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity.  The relay service does not care whether the station is
//! up; it only needs the TCP listener to be reachable, so the main loop
//! polls this adapter alongside the service.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation with scripted failures for host-side tests.
//!
//! ## Reconnection policy
//!
//! After a failed join or a lost link the adapter waits an exponential
//! backoff (2 s → 4 s → 8 s … capped at 60 s) before retrying.
//!
//! Only the boot-time [`connect`](ConnectivityPort::connect) blocks.  Joins
//! started from [`poll`](ConnectivityPort::poll) are fire-and-forget: the
//! adapter sits in [`WifiState::Joining`] and checks the link on each poll
//! until it comes up or [`JOIN_TIMEOUT_SECS`] passes, so the serve loop
//! keeps feeding the task watchdog while the AP is away.

use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::EspError;
#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    /// Join the configured AP, blocking until the interface is up.
    fn connect(&mut self) -> Result<(), CommsError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
    /// Advance reconnection.  Never blocks.
    fn poll(&mut self);
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    /// A background join is in flight.
    Joining { attempt: u32 },
}

const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;

/// Give up on a background join after this long.
pub const JOIN_TIMEOUT_SECS: u64 = 15;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), CommsError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CommsError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), CommsError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(CommsError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff_secs: u64,
    next_attempt: Option<Instant>,
    #[cfg(target_os = "espidf")]
    driver: BlockingWifi<EspWifi<'static>>,
    /// Simulation: join attempts still scripted to fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures: u32,
    /// Simulation: whether the simulated AP link is up.
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
    /// Simulation: joins start but the link never comes up.
    #[cfg(not(target_os = "espidf"))]
    sim_stalled: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(driver: BlockingWifi<EspWifi<'static>>) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            next_attempt: None,
            driver,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff_secs: INITIAL_BACKOFF_SECS,
            next_attempt: None,
            sim_failures: 0,
            sim_link_up: false,
            sim_stalled: false,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Current retry delay in seconds.
    pub fn backoff_secs(&self) -> u64 {
        self.backoff_secs
    }

    /// Drive the reconnect state machine against an explicit clock.
    pub fn poll_at(&mut self, now: Instant) {
        match self.state {
            WifiState::Reconnecting { attempt } => {
                if self.next_attempt.is_some_and(|at| now < at) {
                    return;
                }
                info!("WiFi: reconnect attempt {} (backoff {}s)", attempt, self.backoff_secs);
                match self.platform_begin_join() {
                    Ok(()) => {
                        self.state = WifiState::Joining { attempt };
                        self.next_attempt = Some(now + Duration::from_secs(JOIN_TIMEOUT_SECS));
                        self.check_join(now, attempt);
                    }
                    Err(e) => self.retry_later(now, attempt, e),
                }
            }
            WifiState::Joining { attempt } => self.check_join(now, attempt),
            WifiState::Connected => {
                if !self.platform_is_connected() {
                    warn!("WiFi: connection lost, entering reconnect");
                    self.schedule_retry(now, 0);
                }
            }
            _ => {}
        }
    }

    fn check_join(&mut self, now: Instant, attempt: u32) {
        if self.platform_is_connected() {
            self.on_connected();
        } else if self.next_attempt.is_some_and(|deadline| now >= deadline) {
            self.retry_later(now, attempt, CommsError::ConnectionFailed);
        }
    }

    fn retry_later(&mut self, now: Instant, attempt: u32, e: CommsError) {
        warn!("WiFi: reconnect failed: {}", e);
        self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
        self.schedule_retry(now, attempt + 1);
    }

    fn on_connected(&mut self) {
        self.state = WifiState::Connected;
        self.backoff_secs = INITIAL_BACKOFF_SECS;
        self.next_attempt = None;
        self.log_ip_info();
    }

    fn schedule_retry(&mut self, now: Instant, attempt: u32) {
        self.state = WifiState::Reconnecting { attempt };
        self.next_attempt = Some(now + Duration::from_secs(self.backoff_secs));
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn apply_configuration(&mut self) -> Result<(), CommsError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client = ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| CommsError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| CommsError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        };

        self.driver
            .set_configuration(&Configuration::Client(client))
            .map_err(driver_error)?;
        if !self.driver.is_started().map_err(driver_error)? {
            self.driver.start().map_err(driver_error)?;
        }
        Ok(())
    }

    /// Blocks for up to the driver's connect and netif timeouts.
    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        self.apply_configuration()?;
        self.driver.connect().map_err(driver_error)?;
        self.driver.wait_netif_up().map_err(driver_error)?;
        Ok(())
    }

    /// Returns as soon as the driver has been asked to associate.
    #[cfg(target_os = "espidf")]
    fn platform_begin_join(&mut self) -> Result<(), CommsError> {
        self.apply_configuration()?;
        self.driver.wifi_mut().connect().map_err(driver_error)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        self.platform_begin_join()?;
        if self.sim_link_up {
            Ok(())
        } else {
            Err(CommsError::ConnectionFailed)
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin_join(&mut self) -> Result<(), CommsError> {
        if self.sim_failures > 0 {
            self.sim_failures -= 1;
            warn!("WiFi(sim): simulated join failure ({} left)", self.sim_failures);
            return Err(CommsError::ConnectionFailed);
        }
        if !self.sim_stalled {
            self.sim_link_up = true;
            info!("WiFi(sim): joined '{}'", self.ssid);
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Err(e) = self.driver.disconnect() {
            warn!("WiFi: disconnect failed {:?}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        self.sim_link_up = false;
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }

    #[cfg(target_os = "espidf")]
    fn log_ip_info(&self) {
        match self.driver.wifi().sta_netif().get_ip_info() {
            Ok(ip) => info!("WiFi: connected, IP address {}", ip.ip),
            Err(e) => warn!("WiFi: connected, IP unknown ({:?})", e),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn log_ip_info(&self) {
        info!("WiFi(sim): connected");
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Make the next `count` join attempts fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulate_failures(&mut self, count: u32) {
        self.sim_failures = count;
    }

    /// Drop the simulated AP link without telling the adapter.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulate_link_loss(&mut self) {
        self.sim_link_up = false;
    }

    /// Let joins start without the link ever coming up.
    #[cfg(not(target_os = "espidf"))]
    pub fn simulate_stalled_join(&mut self, stalled: bool) {
        self.sim_stalled = stalled;
    }
}

#[cfg(target_os = "espidf")]
fn driver_error(e: EspError) -> CommsError {
    warn!("WiFi: driver error {:?}", e);
    CommsError::ConnectionFailed
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), CommsError> {
        if self.ssid.is_empty() {
            return Err(CommsError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Err(CommsError::AlreadyConnected);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.state = WifiState::Connecting;

        match self.platform_connect() {
            Ok(()) => {
                self.on_connected();
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                self.schedule_retry(Instant::now(), 0);
                Err(e)
            }
        }
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        self.state = WifiState::Disconnected;
        self.next_attempt = None;
        info!("WiFi: disconnected");
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_connected()
    }

    fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), CommsError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| CommsError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| CommsError::InvalidPassword)?;
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
