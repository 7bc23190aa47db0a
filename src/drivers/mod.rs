//! Relay output driver and watchdog.

pub mod outputs;
pub mod watchdog;
