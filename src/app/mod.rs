//! Application core: pure domain orchestration, zero direct I/O.
//!
//! [`service::RelayService`] runs one connection at a time through the
//! command protocol.  All interaction with sockets, GPIO and the log happens
//! through the **port traits** in [`ports`], so the whole layer is testable
//! with mock adapters.

pub mod events;
pub mod ports;
pub mod service;
