//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use rtproxy::config::ConfigFileError;
use rtproxy::proxy::ProxyError;
use rtproxy::publisher::PublishError;
use rtproxy::replay::ReplayError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the runtime or signal handler
    Runtime(String),
    /// Proxy failed to start
    Proxy(ProxyError),
    /// Failed to send a datagram
    Send(PublishError),
    /// Replay failed
    Replay(ReplayError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Proxy(ProxyError::SocketBindError { port, .. }) = self {
            eprintln!();
            eprintln!("Is another proxy already listening on port {}?", port);
            eprintln!("Use --from-port to listen on a different port.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::Proxy(e) => write!(f, "Proxy error: {}", e),
            CliError::Send(e) => write!(f, "Failed to send datagram: {}", e),
            CliError::Replay(e) => write!(f, "Replay failed: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Proxy(e) => Some(e),
            CliError::Send(e) => Some(e),
            CliError::Replay(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ProxyError> for CliError {
    fn from(e: ProxyError) -> Self {
        CliError::Proxy(e)
    }
}

impl From<PublishError> for CliError {
    fn from(e: PublishError) -> Self {
        CliError::Send(e)
    }
}

impl From<ReplayError> for CliError {
    fn from(e: ReplayError) -> Self {
        CliError::Replay(e)
    }
}
