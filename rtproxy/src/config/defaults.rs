//! Default values and limits for all configuration settings.

use super::file::config_directory;
use super::settings::*;
use crate::publisher::PublishMode;

/// RTTFC input port.
pub const DEFAULT_LISTEN_PORT: u16 = 49005;

/// XPPTraffic multicast group.
pub const DEFAULT_DESTINATION: &str = "239.255.1.1";

/// XPPTraffic port.
pub const DEFAULT_DESTINATION_PORT: u16 = 49900;

pub const DEFAULT_TTL: u32 = 8;

pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 8192;

pub const DEFAULT_QUIESCENCE_MS: u64 = 500;

/// Largest payload of a single IPv4 UDP datagram.
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// Largest multicast TTL.
pub const MAX_TTL: u32 = 255;

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "rtproxy.log";

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_LISTEN_PORT,
        }
    }
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            address: DEFAULT_DESTINATION.to_string(),
            port: DEFAULT_DESTINATION_PORT,
            ttl: DEFAULT_TTL,
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
            mode: PublishMode::default(),
            quiescence_ms: DEFAULT_QUIESCENCE_MS,
            verbose: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_directory().join(DEFAULT_LOG_FILE),
        }
    }
}
