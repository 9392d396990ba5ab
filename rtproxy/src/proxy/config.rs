//! Runtime configuration for the proxy.

use std::time::Duration;

use crate::config::{
    ConfigFile, DEFAULT_DESTINATION, DEFAULT_DESTINATION_PORT, DEFAULT_LISTEN_PORT,
    DEFAULT_MAX_DATAGRAM_SIZE, DEFAULT_QUIESCENCE_MS, DEFAULT_TTL,
};
use crate::publisher::PublishMode;

/// Everything the proxy needs to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// UDP port for incoming RTTFC datagrams
    pub listen_port: u16,
    /// Destination host or multicast group
    pub destination: String,
    pub destination_port: u16,
    /// Multicast time-to-live
    pub ttl: u32,
    /// Serialized size limit of a batch in bytes
    pub max_datagram_size: usize,
    pub mode: PublishMode,
    /// Input silence after which a pending batch is flushed
    pub quiescence: Duration,
    /// Echo outgoing JSON on stdout
    pub verbose: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_LISTEN_PORT,
            destination: DEFAULT_DESTINATION.to_string(),
            destination_port: DEFAULT_DESTINATION_PORT,
            ttl: DEFAULT_TTL,
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
            mode: PublishMode::default(),
            quiescence: Duration::from_millis(DEFAULT_QUIESCENCE_MS),
            verbose: false,
        }
    }
}

impl From<&ConfigFile> for ProxyConfig {
    fn from(file: &ConfigFile) -> Self {
        Self {
            listen_port: file.listen.port,
            destination: file.publish.address.clone(),
            destination_port: file.publish.port,
            ttl: file.publish.ttl,
            max_datagram_size: file.publish.max_datagram_size,
            mode: file.publish.mode,
            quiescence: Duration::from_millis(file.publish.quiescence_ms),
            verbose: file.publish.verbose,
        }
    }
}

impl ProxyConfig {
    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_port = port;
        self
    }

    pub fn with_destination(mut self, host: impl Into<String>, port: u16) -> Self {
        self.destination = host.into();
        self.destination_port = port;
        self
    }

    pub fn with_mode(mut self, mode: PublishMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size;
        self
    }

    pub fn with_quiescence(mut self, window: Duration) -> Self {
        self.quiescence = window;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
