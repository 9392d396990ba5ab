//! Error types for the proxy.

use thiserror::Error;

use crate::publisher::PublishError;

/// Fatal proxy start-up errors.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Failed to bind the listening UDP socket.
    #[error("Failed to bind UDP socket on port {port}: {source}")]
    SocketBindError {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set up the publishing side.
    #[error("Failed to set up publisher: {0}")]
    Publish(#[from] PublishError),
}
