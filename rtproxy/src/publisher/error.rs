//! Error types for publishing traffic datagrams.

use thiserror::Error;

/// Errors that can occur when encoding or sending a datagram.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The destination could not be resolved to a socket address.
    #[error("Failed to resolve destination {target}: {source}")]
    ResolveError {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The destination resolved to no address at all.
    #[error("Destination {0} did not resolve to any address")]
    NoAddress(String),

    /// Failed to create or configure the sending socket.
    #[error("Failed to set up sending socket: {0}")]
    SocketError(#[source] std::io::Error),

    /// JSON encoding failed.
    #[error("Failed to encode traffic JSON: {0}")]
    EncodeError(#[from] serde_json::Error),

    /// The datagram could not be sent.
    #[error("Failed to send datagram: {0}")]
    SendError(#[source] std::io::Error),
}
