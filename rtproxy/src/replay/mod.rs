//! Replay of recorded RTTFC traffic.
//!
//! Each line of a recording is sent as one datagram, which makes a
//! recording a stand-in for a live RTTFC source when testing the proxy.
//! Optionally the recorded timestamps drive the send rate (see
//! [`ReplayClock`]) and the file is replayed in an endless loop.

mod clock;
mod error;

use std::io;
use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::publisher::DatagramSink;

pub use clock::{record_timestamp, rewrite_timestamp, unix_now, Pacing, ReplayClock, Slot};
pub use error::ReplayError;

/// Where recorded lines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaySource {
    File(PathBuf),
    Stdin,
}

/// Counters of a replay session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Times the input was started from the beginning
    pub passes: u64,
    pub lines_sent: u64,
    /// Blank lines
    pub lines_skipped: u64,
    pub send_failures: u64,
}

/// Sends recorded lines into a [`DatagramSink`].
pub struct Replayer<S: DatagramSink> {
    sink: S,
    clock: Option<ReplayClock>,
    verbose: bool,
    stats: ReplayStats,
}

impl<S: DatagramSink> Replayer<S> {
    /// Replayer that sends lines as fast as they are read.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            clock: None,
            verbose: false,
            stats: ReplayStats::default(),
        }
    }

    /// Pace sending by the recorded timestamps.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.clock = Some(ReplayClock::new(pacing));
        self
    }

    /// Print every sent line to stdout.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    /// Replay `source` once, or until cancelled if `looping`.
    pub async fn run(
        &mut self,
        source: &ReplaySource,
        looping: bool,
        shutdown: &CancellationToken,
    ) -> Result<ReplayStats, ReplayError> {
        if looping && *source == ReplaySource::Stdin {
            return Err(ReplayError::LoopRequiresFile);
        }

        loop {
            if let Some(clock) = self.clock.as_mut() {
                clock.reset();
            }
            self.stats.passes += 1;

            let finished = match source {
                ReplaySource::File(path) => {
                    let read_error = |source| ReplayError::ReadError {
                        path: path.clone(),
                        source,
                    };
                    let file = File::open(path).await.map_err(read_error)?;
                    self.replay(BufReader::new(file), shutdown)
                        .await
                        .map_err(read_error)?
                }
                ReplaySource::Stdin => self
                    .replay(BufReader::new(tokio::io::stdin()), shutdown)
                    .await
                    .map_err(ReplayError::StdinError)?,
            };

            if !finished || !looping {
                break;
            }
            debug!(pass = self.stats.passes, "Restarting replay from the beginning");
        }

        info!(
            passes = self.stats.passes,
            lines_sent = self.stats.lines_sent,
            lines_skipped = self.stats.lines_skipped,
            send_failures = self.stats.send_failures,
            "Replay finished"
        );
        Ok(self.stats)
    }

    /// Send every line of `reader`.
    ///
    /// Returns `false` if `shutdown` was cancelled before the end of input.
    pub async fn replay<R>(&mut self, reader: R, shutdown: &CancellationToken) -> io::Result<bool>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => return Ok(false),
                next = lines.next_line() => next?,
            };
            let Some(line) = next else {
                return Ok(true);
            };
            if !self.send_line(&line, shutdown).await {
                return Ok(false);
            }
        }
    }

    /// Returns `false` if cancelled while waiting for the line's slot.
    async fn send_line(&mut self, line: &str, shutdown: &CancellationToken) -> bool {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            self.stats.lines_skipped += 1;
            return true;
        }

        let slot = match (self.clock.as_mut(), record_timestamp(line)) {
            (Some(clock), Some(ts)) => {
                let slot = clock.schedule(ts, unix_now());
                if slot.is_none() {
                    warn!(timestamp = ts, "Record is too far ahead to pace, sending it now");
                }
                slot
            }
            _ => None,
        };

        let payload = match slot {
            Some(slot) => {
                if !slot.wait.is_zero() {
                    debug!(wait_ms = slot.wait.as_millis() as u64, "Waiting for record");
                    tokio::select! {
                        _ = shutdown.cancelled() => return false,
                        _ = tokio::time::sleep(slot.wait) => {}
                    }
                }
                rewrite_timestamp(line, slot.timestamp).unwrap_or_else(|| line.to_string())
            }
            None => line.to_string(),
        };

        match self.sink.send(payload.as_bytes()).await {
            Ok(()) => {
                self.stats.lines_sent += 1;
                if self.verbose {
                    println!("{}", payload);
                }
            }
            Err(e) => {
                self.stats.send_failures += 1;
                warn!(error = %e, bytes = payload.len(), "Failed to send replayed line");
            }
        }
        true
    }
}
