//! Relay board firmware library.
//!
//! Exposes the relay model, command protocol, and serve loop for
//! integration testing and fuzzing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod protocol;
pub mod relay;

pub mod adapters;
pub mod drivers;
