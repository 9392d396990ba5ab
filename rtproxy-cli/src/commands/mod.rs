//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (path, list, init, get, set)
//! - [`proxy`] - Main command (RTTFC in, XPPTraffic out)
//! - [`replay`] - Send a recorded traffic file line by line
//! - [`send`] - Send a single datagram

pub mod common;
pub mod config;
pub mod proxy;
pub mod replay;
pub mod send;
