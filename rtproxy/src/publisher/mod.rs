//! Traffic publishing - single records or size-bounded batches.
//!
//! The [`Publisher`] owns the pending batch and a [`DatagramSink`]. It is
//! fed with converted records and decides when datagrams go out:
//!
//! - **Single mode**: every record is sent at once as one JSON object.
//! - **Batch mode**: records are appended to a [`PendingBatch`]. The batch is
//!   sent as a JSON array when the next record would push it over the size
//!   limit, or when the input goes quiet ([`Publisher::on_idle`]).
//!
//! # Example
//!
//! ```ignore
//! let sink = UdpSink::connect("239.255.1.1", 49900, 8).await?;
//! let mut publisher = Publisher::new(sink, PublishMode::Batch, 8192);
//!
//! publisher.observe(record).await?;
//! // ... no more input for a while
//! publisher.on_idle().await?;
//! ```

mod batch;
mod error;
mod sink;

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::json;
use crate::traffic::TrafficRecord;

pub use batch::{Datagram, PendingBatch};
pub use error::PublishError;
pub use sink::{resolve_target, DatagramSink, MemorySink, UdpSink};

/// How records are packed into datagrams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PublishMode {
    /// Collect records into JSON arrays.
    #[default]
    Batch,
    /// One JSON object per datagram.
    Single,
}

impl fmt::Display for PublishMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishMode::Batch => write!(f, "batch"),
            PublishMode::Single => write!(f, "single"),
        }
    }
}

impl FromStr for PublishMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "batch" => Ok(PublishMode::Batch),
            "single" => Ok(PublishMode::Single),
            other => Err(format!("unknown publish mode '{}'", other)),
        }
    }
}

/// Counters of what has been published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    pub datagrams_sent: u64,
    pub records_sent: u64,
    pub bytes_sent: u64,
    pub send_failures: u64,
}

/// Batch/flush controller in front of a datagram sink.
pub struct Publisher<S: DatagramSink> {
    sink: S,
    mode: PublishMode,
    batch: PendingBatch,
    verbose: bool,
    stats: PublishStats,
}

impl<S: DatagramSink> Publisher<S> {
    /// Create a publisher; `limit` is the serialized size limit of a batch in bytes.
    pub fn new(sink: S, mode: PublishMode, limit: usize) -> Self {
        Self {
            sink,
            mode,
            batch: PendingBatch::new(limit),
            verbose: false,
            stats: PublishStats::default(),
        }
    }

    /// Print every outgoing datagram to stdout.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn mode(&self) -> PublishMode {
        self.mode
    }

    /// Whether records are waiting for a flush.
    pub fn has_pending(&self) -> bool {
        !self.batch.is_empty()
    }

    /// Number of records waiting for a flush.
    pub fn pending_len(&self) -> usize {
        self.batch.len()
    }

    pub fn stats(&self) -> PublishStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Accept one converted record.
    pub async fn observe(&mut self, record: TrafficRecord) -> Result<(), PublishError> {
        match self.mode {
            PublishMode::Single => {
                let payload = json::to_ascii_vec(&record)?;
                if self.verbose {
                    println!("{}", String::from_utf8_lossy(&payload));
                }
                self.send(Datagram {
                    payload,
                    records: 1,
                })
                .await
            }
            PublishMode::Batch => {
                // A push can release two datagrams; a failed send must not hold back the other.
                let mut outcome = Ok(());
                for datagram in self.batch.push(record)? {
                    let sent = self.send_batch(datagram).await;
                    if outcome.is_ok() {
                        outcome = sent;
                    }
                }
                outcome
            }
        }
    }

    /// Input went quiet: flush the pending batch, if any.
    pub async fn on_idle(&mut self) -> Result<(), PublishError> {
        match self.batch.take() {
            Some(datagram) => self.send_batch(datagram).await,
            None => Ok(()),
        }
    }

    async fn send_batch(&mut self, datagram: Datagram) -> Result<(), PublishError> {
        if self.verbose {
            println!("{} traffic records:", datagram.records);
            println!("{}", String::from_utf8_lossy(&datagram.payload));
        }
        self.send(datagram).await
    }

    async fn send(&mut self, datagram: Datagram) -> Result<(), PublishError> {
        match self.sink.send(&datagram.payload).await {
            Ok(()) => {
                self.stats.datagrams_sent += 1;
                self.stats.records_sent += datagram.records as u64;
                self.stats.bytes_sent += datagram.len() as u64;
                debug!(
                    records = datagram.records,
                    bytes = datagram.len(),
                    "Datagram sent"
                );
                Ok(())
            }
            Err(e) => {
                self.stats.send_failures += 1;
                warn!(
                    records = datagram.records,
                    bytes = datagram.len(),
                    error = %e,
                    "Datagram dropped"
                );
                Err(PublishError::SendError(e))
            }
        }
    }
}
