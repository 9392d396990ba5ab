//! Common types shared across CLI commands.

use clap::ValueEnum;
use rtproxy::publisher::PublishMode;

/// Datagram packing selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    /// Collect records into size-limited JSON arrays
    Batch,
    /// One JSON object per datagram
    Single,
}

impl From<ModeArg> for PublishMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Batch => PublishMode::Batch,
            ModeArg::Single => PublishMode::Single,
        }
    }
}
