//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements         | Connects to              |
//! |--------------|--------------------|--------------------------|
//! | `log_sink`   | EventSink          | Serial log output        |
//! | `tcp_server` | Listener           | lwIP / host TCP socket   |
//! |              | Transport          |                          |
//! | `wifi`       | ConnectivityPort   | ESP-IDF WiFi STA         |

pub mod log_sink;
pub mod tcp_server;
pub mod wifi;
