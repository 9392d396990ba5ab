//! Error types for replay.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::publisher::PublishError;

#[derive(Debug, Error)]
pub enum ReplayError {
    /// Failed to open or read a recording.
    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read standard input.
    #[error("Failed to read stdin: {0}")]
    StdinError(#[source] io::Error),

    /// Looping needs a file to restart from.
    #[error("Looping replay requires an input file, not stdin")]
    LoopRequiresFile,

    /// Failed to set up the sender.
    #[error(transparent)]
    Publish(#[from] PublishError),
}
