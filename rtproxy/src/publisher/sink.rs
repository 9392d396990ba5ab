//! Datagram sinks.
//!
//! The [`DatagramSink`] trait is the seam between the publishing logic and
//! the network. [`UdpSink`] sends to a unicast or multicast UDP destination;
//! [`MemorySink`] keeps datagrams in memory for tests and dry runs.

use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};

use tokio::net::{lookup_host, UdpSocket};
use tracing::info;

use super::error::PublishError;

/// Something that accepts whole datagrams.
pub trait DatagramSink: Send {
    /// Send one datagram.
    fn send(&mut self, payload: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}

/// Resolve `host:port`, preferring an IPv4 address.
pub async fn resolve_target(host: &str, port: u16) -> Result<SocketAddr, PublishError> {
    let target = format!("{}:{}", host, port);
    let addrs: Vec<SocketAddr> = lookup_host(&target)
        .await
        .map_err(|source| PublishError::ResolveError {
            target: target.clone(),
            source,
        })?
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or(PublishError::NoAddress(target))
}

/// UDP sender bound to an ephemeral local port.
///
/// If the destination is an IPv4 multicast group, the multicast TTL is set
/// on the socket.
#[derive(Debug)]
pub struct UdpSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpSink {
    /// Resolve the destination and open a socket for it.
    pub async fn connect(host: &str, port: u16, ttl: u32) -> Result<Self, PublishError> {
        let target = resolve_target(host, port).await?;
        Self::open(target, ttl).await
    }

    /// Open a socket for an already resolved destination.
    pub async fn open(target: SocketAddr, ttl: u32) -> Result<Self, PublishError> {
        let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(PublishError::SocketError)?;

        let multicast = match target.ip() {
            IpAddr::V4(ip) if ip.is_multicast() => {
                socket
                    .set_multicast_ttl_v4(ttl)
                    .map_err(PublishError::SocketError)?;
                true
            }
            ip => ip.is_multicast(),
        };

        info!(
            target = %target,
            multicast,
            ttl,
            "UDP sender ready"
        );

        Ok(Self { socket, target })
    }

    /// Destination address.
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl DatagramSink for UdpSink {
    async fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        self.socket.send_to(payload, self.target).await.map(|_| ())
    }
}

/// Sink that records every datagram.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    datagrams: Vec<Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Datagrams sent so far, oldest first.
    pub fn datagrams(&self) -> &[Vec<u8>] {
        &self.datagrams
    }

    /// Remove and return all recorded datagrams.
    pub fn take(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.datagrams)
    }
}

impl DatagramSink for MemorySink {
    async fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        self.datagrams.push(payload.to_vec());
        Ok(())
    }
}
