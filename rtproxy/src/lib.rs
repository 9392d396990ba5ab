//! rtproxy - RealTraffic to XPPTraffic bridge
//!
//! Receives RealTraffic RTTFC CSV datagrams, converts each record to the
//! XPPTraffic JSON format and republishes it over UDP multicast, either one
//! record per datagram or as size-limited JSON arrays.
//!
//! # Example
//!
//! ```ignore
//! use rtproxy::proxy::{ProxyConfig, TrafficProxy};
//! use tokio_util::sync::CancellationToken;
//!
//! let proxy = TrafficProxy::bind(&ProxyConfig::default()).await?;
//! let stats = proxy.run(CancellationToken::new()).await;
//! ```

pub mod config;
pub mod json;
pub mod logging;
pub mod proxy;
pub mod publisher;
pub mod replay;
pub mod rttfc;
pub mod traffic;

/// Version of the rtproxy library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
