//! Replay command - send a recorded traffic file line by line.

use std::path::PathBuf;

use clap::Args;
use rtproxy::config::DEFAULT_LISTEN_PORT;
use rtproxy::publisher::UdpSink;
use rtproxy::replay::{Pacing, ReplaySource, Replayer};

use crate::error::CliError;
use crate::runner::{CliRunner, GlobalOptions, LogTarget};

/// Arguments for the replay command.
#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Data file, each line is a record [default: stdin]
    pub file: Option<PathBuf>,

    /// UDP target host or IP to send the data to
    #[arg(long, value_name = "NAME_OR_IP", default_value = "localhost")]
    pub host: String,

    /// UDP port to send traffic data to
    #[arg(short, long, value_name = "NUM", default_value_t = DEFAULT_LISTEN_PORT)]
    pub port: u16,

    /// Endless loop: restart from the beginning when reaching end of file
    #[arg(short = 'l', long = "loop", requires = "file")]
    pub looping: bool,

    /// Send records at the pace of their RTTFC timestamps
    #[arg(long)]
    pub pace: bool,

    /// Seconds that paced records lag behind wall-clock time [default: 0]
    #[arg(long, value_name = "SECS", requires = "pace")]
    pub buffer_period: Option<f64>,

    /// Seconds subtracted from the forwarded timestamps [default: 0]
    #[arg(long, value_name = "SECS", requires = "pace")]
    pub historic: Option<f64>,

    /// Print each sent record
    #[arg(short, long)]
    pub verbose: bool,
}

impl ReplayArgs {
    fn source(&self) -> ReplaySource {
        match &self.file {
            Some(path) => ReplaySource::File(path.clone()),
            None => ReplaySource::Stdin,
        }
    }

    fn pacing(&self) -> Option<Pacing> {
        self.pace.then_some(Pacing {
            buffer_period: self.buffer_period.unwrap_or(0.0),
            historic: self.historic.unwrap_or(0.0),
        })
    }
}

/// Run the replay command.
pub fn run(options: &GlobalOptions, args: ReplayArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(options, LogTarget::Console)?;
    runner.log_startup("replay");
    let shutdown = runner.shutdown_token()?;

    let stats = runner.block_on(async {
        // Multicast TTL does not apply to replay targets
        let sink = UdpSink::connect(&args.host, args.port, 1).await?;
        let mut replayer = Replayer::new(sink).with_verbose(args.verbose);
        if let Some(pacing) = args.pacing() {
            replayer = replayer.with_pacing(pacing);
        }
        Ok::<_, CliError>(replayer.run(&args.source(), args.looping, &shutdown).await?)
    })?;

    if args.verbose {
        println!(
            "Sent {} records in {} pass(es)",
            stats.lines_sent, stats.passes
        );
    }
    Ok(())
}
