//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, the async runtime
//! and Ctrl-C handling so command handlers only deal with their own work.

use std::future::Future;
use std::path::PathBuf;

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::info;

use rtproxy::config::ConfigFile;
use rtproxy::logging::{init_console_logging, init_logging, split_log_path, LoggingGuard};

use crate::error::CliError;

/// Options shared by all commands.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Config file to use instead of ~/.rtproxy/config.ini
    pub config: Option<PathBuf>,
    /// Default to debug-level logging
    pub debug: bool,
    /// Mirror the log file on stdout
    pub log_stdout: bool,
}

impl GlobalOptions {
    /// Load the selected config file, or defaults if it does not exist.
    pub fn load_config(&self) -> Result<ConfigFile, CliError> {
        let config = match &self.config {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };
        Ok(config)
    }
}

/// Where a command's log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// The configured log file (long-running commands)
    File,
    /// stderr only, so a running proxy's log file is left alone
    Console,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: Option<LoggingGuard>,
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Load config, initialize logging and start the runtime.
    pub fn new(options: &GlobalOptions, target: LogTarget) -> Result<Self, CliError> {
        let config = options.load_config()?;

        let logging_guard = match target {
            LogTarget::File => {
                let (log_dir, log_file) = split_log_path(&config.logging.file);
                let guard = init_logging(&log_dir, &log_file, options.log_stdout, options.debug)
                    .map_err(|e| CliError::LoggingInit(e.to_string()))?;
                Some(guard)
            }
            LogTarget::Console => {
                init_console_logging(options.debug);
                None
            }
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("rtproxy v{}", rtproxy::VERSION);
        info!("rtproxy CLI: {} command", command);
    }

    /// Drive a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Token that is cancelled on Ctrl-C.
    pub fn shutdown_token(&self) -> Result<CancellationToken, CliError> {
        let token = CancellationToken::new();
        let on_signal = token.clone();
        ctrlc::set_handler(move || {
            on_signal.cancel();
        })
        .map_err(|e| CliError::Runtime(format!("Failed to set signal handler: {}", e)))?;
        Ok(token)
    }
}
