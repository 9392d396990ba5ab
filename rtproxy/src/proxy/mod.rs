//! RTTFC → XPPTraffic proxy.
//!
//! Receives RTTFC datagrams on a UDP port, converts each one with
//! [`rttfc::convert`](crate::rttfc::convert) and hands the result to a
//! [`Publisher`](crate::publisher::Publisher).
//!
//! # Control flow
//!
//! ```text
//! recv ──► convert ──► observe ──┬─► send now (single / batch full)
//!   ▲                            └─► buffer
//!   │
//!   └── no datagram within the quiescence window ──► flush batch
//! ```
//!
//! Everything runs in one task. The only suspension point is the receive,
//! which waits forever while nothing is buffered and at most one
//! quiescence window while a batch is accumulating.

mod config;
mod error;
mod idle;
mod receiver;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use idle::IdleTimer;
pub use receiver::{ProxyStats, TrafficProxy};
