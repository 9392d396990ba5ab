//! Proxy command - receive RTTFC and publish XPPTraffic until Ctrl-C.

use std::time::Duration;

use clap::Args;
use rtproxy::config::ConfigFile;
use rtproxy::proxy::{ProxyConfig, TrafficProxy};
use rtproxy::publisher::PublishMode;
use tracing::info;

use super::common::ModeArg;
use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions, LogTarget};

/// Arguments for the proxy command.
///
/// Unset options fall back to config.ini, then to built-in defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct ProxyArgs {
    /// UDP port to listen to for RTTFC data [default: 49005]
    #[arg(short = 'f', long, value_name = "NUM")]
    pub from_port: Option<u16>,

    /// Multicast group or host to send the data to [default: 239.255.1.1]
    #[arg(short = 'a', long, value_name = "NAME_OR_IP")]
    pub to_address: Option<String>,

    /// UDP port to send traffic data to [default: 49900]
    #[arg(short = 'p', long, value_name = "NUM")]
    pub to_port: Option<u16>,

    /// Multicast time to live [default: 8]
    #[arg(long, value_name = "NUM")]
    pub ttl: Option<u32>,

    /// Size limit of a JSON array datagram in bytes [default: 8192]
    #[arg(long, value_name = "NUM")]
    pub buf_size: Option<usize>,

    /// Datagram packing [default: batch]
    #[arg(long, value_enum, conflicts_with = "single")]
    pub mode: Option<ModeArg>,

    /// Send single JSON records instead of collated arrays (same as --mode single)
    #[arg(long)]
    pub single: bool,

    /// Input silence in milliseconds after which a batch is sent [default: 500]
    #[arg(long, value_name = "MS")]
    pub quiescence_ms: Option<u64>,

    /// Print every sent datagram
    #[arg(short, long)]
    pub verbose: bool,
}

impl ProxyArgs {
    /// Overlay command line options on the config file.
    pub fn resolve(&self, file: &ConfigFile) -> ProxyConfig {
        let mut config = ProxyConfig::from(file);

        if let Some(port) = self.from_port {
            config.listen_port = port;
        }
        if let Some(address) = &self.to_address {
            config.destination = address.clone();
        }
        if let Some(port) = self.to_port {
            config.destination_port = port;
        }
        if let Some(ttl) = self.ttl {
            config.ttl = ttl;
        }
        if let Some(size) = self.buf_size {
            config.max_datagram_size = size;
        }
        if self.single {
            config.mode = PublishMode::Single;
        } else if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(ms) = self.quiescence_ms {
            config.quiescence = Duration::from_millis(ms);
        }
        config.verbose |= self.verbose;

        config
    }
}

/// Run the proxy command.
pub fn run(options: &GlobalOptions, args: ProxyArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(options, LogTarget::File)?;
    runner.log_startup("proxy");

    let config = args.resolve(runner.config());
    if config.max_datagram_size == 0 {
        return Err(CliError::Config(
            "--buf-size must be at least 1 byte".to_string(),
        ));
    }
    if config.quiescence.is_zero() {
        return Err(CliError::Config(
            "--quiescence-ms must be at least 1".to_string(),
        ));
    }

    let shutdown = runner.shutdown_token()?;

    let stats = runner.block_on(async {
        let proxy = TrafficProxy::bind(&config).await?;
        println!(
            "Listening for RTTFC on port {}, sending {} to {}:{} (Ctrl-C to stop)",
            config.listen_port, config.mode, config.destination, config.destination_port
        );
        Ok::<_, CliError>(proxy.run(shutdown).await)
    })?;

    info!("Proxy shut down");
    println!(
        "Received {} datagrams ({} rejected), sent {} records in {} datagrams",
        stats.datagrams_received,
        stats.records_rejected,
        stats.publish.records_sent,
        stats.publish.datagrams_sent
    );
    Ok(())
}
