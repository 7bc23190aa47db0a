//! Relay output driver.
//!
//! [`OutputBank`] implements [`GpioPort`] over any set of `embedded-hal`
//! [`OutputPin`]s addressed by GPIO number.  On the device the pins are
//! `esp-idf-hal` [`PinDriver`](esp_idf_hal::gpio::PinDriver)s built by
//! [`esp_output_bank`]; host tests plug in mock pins.
//!
//! Pin errors are logged and swallowed: the relay model is the source of
//! truth and the next write to the same pin retries the level.
//!
//! A driver comes up LOW, which energizes an active-low relay.  Pins are
//! therefore added through [`OutputBank::add_released`], which drives them
//! HIGH before they are stored, and [`GpioPort::configure_output`] only checks
//! that a driver exists.

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::app::ports::GpioPort;
use crate::pins::RELAY_COUNT;

pub struct OutputBank<P: OutputPin> {
    pins: heapless::Vec<(u8, P), RELAY_COUNT>,
}

impl<P: OutputPin> Default for OutputBank<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OutputPin> OutputBank<P> {
    pub fn new() -> Self {
        Self {
            pins: heapless::Vec::new(),
        }
    }

    /// Register `pin` under GPIO `address`.  Hands the pin back if the bank is full.
    pub fn add(&mut self, address: u8, pin: P) -> Result<(), P> {
        self.pins.push((address, pin)).map_err(|(_, pin)| pin)
    }

    /// Drive `pin` HIGH (relay released), then register it under `address`.
    pub fn add_released(&mut self, address: u8, mut pin: P) -> Result<(), P::Error> {
        pin.set_high()?;
        if self.add(address, pin).is_err() {
            warn!("relay output bank full, GPIO{} dropped", address);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    fn find(&mut self, address: u8) -> Option<&mut P> {
        self.pins
            .iter_mut()
            .find(|(a, _)| *a == address)
            .map(|(_, p)| p)
    }
}

impl<P: OutputPin> GpioPort for OutputBank<P> {
    fn configure_output(&mut self, pin: u8) {
        if self.find(pin).is_some() {
            debug!("GPIO{} configured as output", pin);
        } else {
            warn!("GPIO{} has no output driver", pin);
        }
    }

    fn write(&mut self, pin: u8, high: bool) {
        let Some(driver) = self.find(pin) else {
            warn!("write to unknown GPIO{}", pin);
            return;
        };
        let result = if high {
            driver.set_high()
        } else {
            driver.set_low()
        };
        if let Err(e) = result {
            warn!("GPIO{} write failed: {:?}", pin, e);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF construction
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub type EspRelayPin =
    esp_idf_hal::gpio::PinDriver<'static, esp_idf_hal::gpio::AnyOutputPin, esp_idf_hal::gpio::Output>;

/// Build output drivers for the configured relay GPIOs, every relay released.
///
/// Consumes the typed [`Pins`](esp_idf_hal::gpio::Pins) set so that no other
/// handle to a GPIO survives once the numbered drivers exist.
#[cfg(target_os = "espidf")]
pub fn esp_output_bank(
    pins: esp_idf_hal::gpio::Pins,
    addresses: &[u8; RELAY_COUNT],
) -> Result<OutputBank<EspRelayPin>, esp_idf_svc::sys::EspError> {
    use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};

    drop(pins);
    let mut bank = OutputBank::new();
    for &address in addresses {
        // SAFETY: the typed pin set was consumed above, and
        // `SystemConfig::validate` rejects duplicate addresses, so each GPIO
        // has exactly one driver.
        let pin = unsafe { AnyOutputPin::new(i32::from(address)) };
        bank.add_released(address, PinDriver::output(pin)?)?;
    }
    Ok(bank)
}
