//! UDP receive loop.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::config::ProxyConfig;
use super::error::ProxyError;
use super::idle::IdleTimer;
use crate::publisher::{DatagramSink, PublishError, PublishStats, Publisher, UdpSink};
use crate::rttfc;

/// Receive buffer size; any UDP payload fits.
const MAX_PACKET_SIZE: usize = 65_536;

/// Length of the input preview attached to rejection logs.
const PREVIEW_LEN: usize = 80;

/// Counters collected over a proxy session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyStats {
    pub datagrams_received: u64,
    pub records_converted: u64,
    pub records_rejected: u64,
    pub publish: PublishStats,
}

/// RTTFC listener feeding a [`Publisher`].
pub struct TrafficProxy<S: DatagramSink> {
    socket: UdpSocket,
    publisher: Publisher<S>,
    idle: IdleTimer,
    stats: ProxyStats,
}

impl TrafficProxy<UdpSink> {
    /// Bind the listening socket and open the UDP publisher described by `config`.
    pub async fn bind(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let sink = UdpSink::connect(&config.destination, config.destination_port, config.ttl)
            .await?;
        Self::with_sink(config, sink).await
    }
}

impl<S: DatagramSink> TrafficProxy<S> {
    /// Bind the listening socket and publish into `sink`.
    pub async fn with_sink(config: &ProxyConfig, sink: S) -> Result<Self, ProxyError> {
        let socket = bind_shared(config.listen_port).map_err(|e| ProxyError::SocketBindError {
            port: config.listen_port,
            source: e,
        })?;

        let publisher = Publisher::new(sink, config.mode, config.max_datagram_size)
            .with_verbose(config.verbose);

        info!(
            port = config.listen_port,
            local_addr = ?socket.local_addr().ok(),
            mode = %config.mode,
            max_datagram_size = config.max_datagram_size,
            quiescence_ms = config.quiescence.as_millis() as u64,
            "RTTFC proxy listening"
        );

        Ok(Self {
            socket,
            publisher,
            idle: IdleTimer::new(config.quiescence),
            stats: ProxyStats::default(),
        })
    }

    /// Address the listening socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn publisher(&self) -> &Publisher<S> {
        &self.publisher
    }

    pub fn stats(&self) -> ProxyStats {
        ProxyStats {
            publish: self.publisher.stats(),
            ..self.stats
        }
    }

    /// Receive and forward until `shutdown` is cancelled.
    ///
    /// A pending batch is flushed once more before returning.
    pub async fn run(mut self, shutdown: CancellationToken) -> ProxyStats {
        let mut buffer = vec![0u8; MAX_PACKET_SIZE];

        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Shutdown requested");
                    break;
                }
                received = receive(&self.socket, &mut buffer, self.idle.wait()) => received,
            };

            match received {
                Some(Ok(len)) => self.handle_datagram(&buffer[..len]).await,
                Some(Err(e)) => {
                    warn!(error = %e, "UDP receive error");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                None => self.handle_idle().await,
            }
        }

        if self.publisher.has_pending() {
            debug!(
                records = self.publisher.pending_len(),
                "Flushing pending batch"
            );
            self.handle_idle().await;
        }

        let stats = self.stats();
        info!(
            datagrams_received = stats.datagrams_received,
            records_converted = stats.records_converted,
            records_rejected = stats.records_rejected,
            datagrams_sent = stats.publish.datagrams_sent,
            records_sent = stats.publish.records_sent,
            send_failures = stats.publish.send_failures,
            "RTTFC proxy stopped"
        );
        stats
    }

    /// Convert one received datagram and pass it to the publisher.
    ///
    /// An empty datagram counts as quiet input and flushes the pending batch.
    pub async fn handle_datagram(&mut self, data: &[u8]) {
        if data.is_empty() {
            debug!("Empty datagram, treating as idle");
            self.handle_idle().await;
            return;
        }

        self.stats.datagrams_received += 1;
        if self.stats.datagrams_received == 1 {
            info!(bytes = data.len(), "Received first RTTFC datagram");
        }

        match rttfc::convert(data) {
            Ok(record) => {
                self.stats.records_converted += 1;
                trace!(id = ?record.id, "Converted RTTFC record");
                if let Err(e) = self.publisher.observe(record).await {
                    report_publish_error(&e, "Failed to publish record");
                }
            }
            Err(e) => {
                self.stats.records_rejected += 1;
                warn!(
                    error = %e,
                    preview = %preview(data),
                    "Rejected RTTFC record"
                );
            }
        }

        self.idle.datagram_received(self.publisher.mode());
    }

    /// The quiescence window passed without input.
    pub async fn handle_idle(&mut self) {
        self.idle.expired();
        if let Err(e) = self.publisher.on_idle().await {
            report_publish_error(&e, "Failed to flush batch");
        }
    }
}

/// Log a publish error. Send failures were already logged by the publisher.
fn report_publish_error(error: &PublishError, message: &str) {
    match error {
        PublishError::SendError(_) => debug!(error = %error, "{}", message),
        _ => warn!(error = %error, "{}", message),
    }
}

/// Bind `0.0.0.0:port` with address reuse, so other RTTFC consumers can
/// listen on the same port.
fn bind_shared(port: u16) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
    socket.set_reuse_port(true)?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    socket.bind(&addr.into())?;

    socket.set_nonblocking(true)?;
    UdpSocket::from_std(socket.into())
}

/// Receive one datagram; `None` if `wait` elapsed first.
async fn receive(
    socket: &UdpSocket,
    buffer: &mut [u8],
    wait: Option<Duration>,
) -> Option<io::Result<usize>> {
    match wait {
        Some(window) => tokio::time::timeout(window, socket.recv(buffer))
            .await
            .ok(),
        None => Some(socket.recv(buffer).await),
    }
}

fn preview(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(&data[..data.len().min(PREVIEW_LEN)]);
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::{MemorySink, PublishMode};

    const LINE: &str = "RTTFC,11234042,-33.9425,151.1741,300,1,0,0,0,QFA1,B744,VH-OEJ,SYD,LAX,\
                        1650000000.5,0,0,0,275,0,0,0,0,2.5,87.0,88.5,0,0,A5";

    fn config(mode: PublishMode) -> ProxyConfig {
        ProxyConfig::default()
            .with_listen_port(0)
            .with_mode(mode)
            .with_quiescence(Duration::from_millis(50))
    }

    async fn proxy(mode: PublishMode) -> TrafficProxy<MemorySink> {
        TrafficProxy::with_sink(&config(mode), MemorySink::new())
            .await
            .unwrap()
    }

    #[test]
    fn test_preview_truncates() {
        let long = "X".repeat(200);
        assert_eq!(preview(long.as_bytes()).len(), PREVIEW_LEN);
        assert_eq!(preview(b"RTTFC,1\r\n"), "RTTFC,1");
    }

    #[tokio::test]
    async fn test_bind_conflict_is_fatal() {
        // Holder without address reuse
        let taken = UdpSocket::bind("0.0.0.0:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let config = config(PublishMode::Batch).with_listen_port(port);
        let result = TrafficProxy::with_sink(&config, MemorySink::new()).await;
        match result {
            Err(ProxyError::SocketBindError { port: p, .. }) => assert_eq!(p, port),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("second bind on port {port} succeeded"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_listen_port_can_be_shared() {
        let first = proxy(PublishMode::Batch).await;
        let port = first.local_addr().unwrap().port();

        let shared = config(PublishMode::Batch).with_listen_port(port);
        let second = TrafficProxy::with_sink(&shared, MemorySink::new())
            .await
            .unwrap();
        assert_eq!(second.local_addr().unwrap().port(), port);
    }

    #[tokio::test]
    async fn test_handle_datagram_counts() {
        let mut proxy = proxy(PublishMode::Batch).await;

        proxy.handle_datagram(LINE.as_bytes()).await;
        proxy.handle_datagram(b"RTTFC,1,2,3").await;
        proxy.handle_datagram(&[0xff, 0xfe]).await;

        let stats = proxy.stats();
        assert_eq!(stats.datagrams_received, 3);
        assert_eq!(stats.records_converted, 1);
        assert_eq!(stats.records_rejected, 2);
        assert_eq!(proxy.publisher().pending_len(), 1);
    }

    #[tokio::test]
    async fn test_batch_mode_arms_idle_timer() {
        let mut proxy = proxy(PublishMode::Batch).await;
        assert_eq!(proxy.idle.wait(), None);

        proxy.handle_datagram(LINE.as_bytes()).await;
        assert_eq!(proxy.idle.wait(), Some(Duration::from_millis(50)));

        proxy.handle_idle().await;
        assert_eq!(proxy.idle.wait(), None);
        assert_eq!(proxy.publisher().sink().datagrams().len(), 1);
        assert_eq!(proxy.stats().publish.records_sent, 1);
    }

    #[tokio::test]
    async fn test_single_mode_sends_immediately() {
        let mut proxy = proxy(PublishMode::Single).await;
        proxy.handle_datagram(LINE.as_bytes()).await;

        assert_eq!(proxy.idle.wait(), None);
        let sent = proxy.publisher().sink().datagrams();
        assert_eq!(sent.len(), 1);
        let value: serde_json::Value = serde_json::from_slice(&sent[0]).unwrap();
        assert_eq!(value["id"], serde_json::Value::from("00ab6afa"));
    }

    #[tokio::test]
    async fn test_empty_datagram_flushes_like_idle() {
        let mut proxy = proxy(PublishMode::Batch).await;
        proxy.handle_datagram(LINE.as_bytes()).await;

        proxy.handle_datagram(b"").await;

        let stats = proxy.stats();
        assert_eq!(stats.datagrams_received, 1);
        assert_eq!(stats.records_rejected, 0);
        assert_eq!(stats.publish.records_sent, 1);
        assert!(!proxy.publisher().has_pending());
        assert_eq!(proxy.idle.wait(), None);
    }

    /// Sink whose sends always fail.
    struct UnreachableSink;

    impl DatagramSink for UnreachableSink {
        async fn send(&mut self, _payload: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "unreachable"))
        }
    }

    #[tokio::test]
    async fn test_send_failures_do_not_stop_the_proxy() {
        let mut proxy = TrafficProxy::with_sink(&config(PublishMode::Single), UnreachableSink)
            .await
            .unwrap();

        proxy.handle_datagram(LINE.as_bytes()).await;
        proxy.handle_datagram(LINE.as_bytes()).await;

        let stats = proxy.stats();
        assert_eq!(stats.records_converted, 2);
        assert_eq!(stats.publish.send_failures, 2);
        assert_eq!(stats.publish.datagrams_sent, 0);
    }

    #[tokio::test]
    async fn test_failed_idle_flush_clears_batch() {
        let mut proxy = TrafficProxy::with_sink(&config(PublishMode::Batch), UnreachableSink)
            .await
            .unwrap();

        proxy.handle_datagram(LINE.as_bytes()).await;
        proxy.handle_idle().await;

        assert!(!proxy.publisher().has_pending());
        assert_eq!(proxy.stats().publish.send_failures, 1);
        assert_eq!(proxy.idle.wait(), None);
    }

    #[tokio::test]
    async fn test_run_flushes_on_shutdown() {
        let proxy = TrafficProxy::with_sink(
            &config(PublishMode::Batch).with_quiescence(Duration::from_secs(3600)),
            MemorySink::new(),
        )
        .await
        .unwrap();
        let addr = proxy.local_addr().unwrap();

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(proxy.run(shutdown.clone()));

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender
            .send_to(LINE.as_bytes(), ("127.0.0.1", addr.port()))
            .await
            .unwrap();

        // Give the loop a moment to pick the datagram up
        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown.cancel();

        let stats = handle.await.unwrap();
        assert_eq!(stats.datagrams_received, 1);
        assert_eq!(stats.publish.datagrams_sent, 1);
        assert_eq!(stats.publish.records_sent, 1);
    }
}
