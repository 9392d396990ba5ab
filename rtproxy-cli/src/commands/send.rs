//! Send command - send one datagram by hand.
//!
//! Handy for poking a running proxy with a single RTTFC line, or for
//! checking that XPPTraffic listeners receive a hand-written JSON record.

use clap::Args;
use rtproxy::config::DEFAULT_LISTEN_PORT;
use rtproxy::publisher::{DatagramSink, PublishError, UdpSink};

use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions, LogTarget};

/// Arguments for the send command.
#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    /// The text to send
    pub datagram: String,

    /// UDP target host, IP or multicast group
    #[arg(long, value_name = "NAME_OR_IP", default_value = "localhost")]
    pub host: String,

    /// UDP port to send the datagram to
    #[arg(short, long, value_name = "NUM", default_value_t = DEFAULT_LISTEN_PORT)]
    pub port: u16,

    /// Multicast time to live, used for multicast targets only
    #[arg(long, value_name = "NUM", default_value_t = 8)]
    pub ttl: u32,

    /// Print the sent datagram
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the send command.
pub fn run(options: &GlobalOptions, args: SendArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(options, LogTarget::Console)?;

    runner.block_on(async {
        let mut sink = UdpSink::connect(&args.host, args.port, args.ttl).await?;
        sink.send(args.datagram.as_bytes())
            .await
            .map_err(PublishError::SendError)?;
        Ok::<_, PublishError>(())
    })?;

    if args.verbose {
        println!("{}", args.datagram);
    }
    Ok(())
}
