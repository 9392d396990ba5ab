//! rtproxy CLI - Command-line interface
//!
//! Runs the RTTFC → XPPTraffic proxy and the small helper tools around it.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::proxy::ProxyArgs;
use commands::replay::ReplayArgs;
use commands::send::SendArgs;
use runner::GlobalOptions;

#[derive(Parser)]
#[command(name = "rtproxy")]
#[command(version = rtproxy::VERSION)]
#[command(about = "Forward RealTraffic RTTFC data as XPPTraffic JSON via UDP multicast", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.rtproxy/config.ini
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Mirror log output on stdout
    #[arg(long, global = true)]
    log_stdout: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive RTTFC data and publish it as XPPTraffic JSON
    Proxy(ProxyArgs),

    /// Send a single UDP datagram
    Send(SendArgs),

    /// Send a recorded file line by line as UDP datagrams
    Replay(ReplayArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();
    let options = GlobalOptions {
        config: cli.config,
        debug: cli.debug,
        log_stdout: cli.log_stdout,
    };

    let result = match cli.command {
        Commands::Proxy(args) => commands::proxy::run(&options, args),
        Commands::Send(args) => commands::send::run(&options, args),
        Commands::Replay(args) => commands::replay::run(&options, args),
        Commands::Config(command) => commands::config::run(&options, command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
