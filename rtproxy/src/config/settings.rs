//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;

use crate::publisher::PublishMode;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Where RTTFC input arrives
    pub listen: ListenSettings,
    /// Where XPPTraffic output goes and how it is packed
    pub publish: PublishSettings,
    /// Log file location
    pub logging: LoggingSettings,
}

/// `[listen]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenSettings {
    /// UDP port for incoming RTTFC datagrams
    pub port: u16,
}

/// `[publish]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    /// Destination host or multicast group
    pub address: String,
    /// Destination UDP port
    pub port: u16,
    /// Multicast time-to-live
    pub ttl: u32,
    /// Serialized size limit of a batch in bytes
    pub max_datagram_size: usize,
    /// Batch or single-record datagrams
    pub mode: PublishMode,
    /// Input silence after which a pending batch is flushed
    pub quiescence_ms: u64,
    /// Echo outgoing JSON on stdout
    pub verbose: bool,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
