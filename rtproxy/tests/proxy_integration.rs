//! Integration tests for the proxy over real loopback sockets.
//!
//! Each test runs a [`TrafficProxy`] on an ephemeral port, publishing by
//! unicast to a local receiver socket.
//!
//! Run with: `cargo test --test proxy_integration`

use std::time::Duration;

use serde_json::Value;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use rtproxy::proxy::{ProxyConfig, ProxyStats, TrafficProxy};
use rtproxy::publisher::PublishMode;

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

/// RTTFC line for an aircraft with the given id and registration.
fn rttfc(id: u64, reg: &str) -> String {
    format!(
        "RTTFC,{id},47.4497,8.5622,4100,-640,0,250,140,SWR{id},A320,{reg},ZRH,LHR,\
         1650000000.25,0,0,0,4250,0,0,0,0,-3.5,200.0,201.5,0,0,A3"
    )
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    /// Where the proxy publishes to
    output: UdpSocket,
    /// Feeds the proxy
    input: UdpSocket,
    shutdown: CancellationToken,
    handle: JoinHandle<ProxyStats>,
}

impl Harness {
    async fn start(mode: PublishMode, max_datagram_size: usize, quiescence: Duration) -> Self {
        let output = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let out_port = output.local_addr().unwrap().port();

        let config = ProxyConfig::default()
            .with_listen_port(0)
            .with_destination("127.0.0.1", out_port)
            .with_mode(mode)
            .with_max_datagram_size(max_datagram_size)
            .with_quiescence(quiescence);

        let proxy = TrafficProxy::bind(&config).await.unwrap();
        let in_port = proxy.local_addr().unwrap().port();

        let input = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        input.connect(("127.0.0.1", in_port)).await.unwrap();

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(proxy.run(shutdown.clone()));

        Self {
            output,
            input,
            shutdown,
            handle,
        }
    }

    async fn send(&self, line: &str) {
        self.input.send(line.as_bytes()).await.unwrap();
    }

    async fn recv(&self) -> Vec<u8> {
        let mut buf = vec![0u8; 65536];
        let len = tokio::time::timeout(RECEIVE_TIMEOUT, self.output.recv(&mut buf))
            .await
            .expect("timed out waiting for proxy output")
            .unwrap();
        buf.truncate(len);
        buf
    }

    async fn recv_json(&self) -> Value {
        serde_json::from_slice(&self.recv().await).unwrap()
    }

    /// Assert nothing arrives within `window`.
    async fn expect_silence(&self, window: Duration) {
        let mut buf = vec![0u8; 65536];
        let result = tokio::time::timeout(window, self.output.recv(&mut buf)).await;
        assert!(result.is_err(), "unexpected datagram");
    }

    async fn stop(self) -> ProxyStats {
        self.shutdown.cancel();
        self.handle.await.unwrap()
    }
}

fn ids(batch: &Value) -> Vec<Value> {
    batch
        .as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|record| record["id"].clone())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_burst_is_flushed_as_one_array_after_quiescence() {
    let harness = Harness::start(PublishMode::Batch, 8192, Duration::from_millis(150)).await;

    for id in 1..=5 {
        harness.send(&rttfc(id, "HB-JLT")).await;
    }

    let batch = harness.recv_json().await;
    assert_eq!(
        ids(&batch),
        vec![
            Value::from(1),
            Value::from("00000002"),
            Value::from(3),
            Value::from("00000004"),
            Value::from(5)
        ]
    );

    let first = &batch[0];
    assert_eq!(first["ident"]["reg"], Value::from("HB-JLT"));
    assert_eq!(first["ident"]["label"], Value::from("SWR1 (A320): ZRH -> LHR"));
    assert_eq!(first["type"]["icao"], Value::from("A320"));
    assert_eq!(first["position"]["alt_geo"], Value::from(4250));
    assert_eq!(first["attitude"]["roll"], Value::from(-3.5));
    assert_eq!(first["attitude"]["heading"], Value::from(201.5));

    let stats = harness.stop().await;
    assert_eq!(stats.records_converted, 5);
    assert_eq!(stats.publish.datagrams_sent, 1);
}

#[tokio::test]
async fn test_single_mode_sends_one_object_per_record() {
    let harness = Harness::start(PublishMode::Single, 8192, Duration::from_millis(150)).await;

    for id in [11, 12, 13] {
        harness.send(&rttfc(id, "HB-JLT")).await;
    }

    assert_eq!(harness.recv_json().await["id"], Value::from(11));
    assert_eq!(harness.recv_json().await["id"], Value::from("0000000c"));
    assert_eq!(harness.recv_json().await["id"], Value::from(13));

    let stats = harness.stop().await;
    assert_eq!(stats.publish.datagrams_sent, 3);
}

#[tokio::test]
async fn test_malformed_input_does_not_affect_later_records() {
    let harness = Harness::start(PublishMode::Batch, 8192, Duration::from_millis(150)).await;

    harness.send("RTTFC,1,2,3,4,5,6,7,8,9").await;
    harness.send(&rttfc(7, "HB-JLT").replace("RTTFC", "RTTFX")).await;
    harness.send(&rttfc(21, "HB-JLT")).await;

    let batch = harness.recv_json().await;
    assert_eq!(ids(&batch), vec![Value::from(21)]);

    let stats = harness.stop().await;
    assert_eq!(stats.datagrams_received, 3);
    assert_eq!(stats.records_rejected, 2);
    assert_eq!(stats.records_converted, 1);
}

#[tokio::test]
async fn test_only_rejected_input_publishes_nothing() {
    let harness = Harness::start(PublishMode::Batch, 8192, Duration::from_millis(100)).await;

    harness.send("not traffic at all").await;
    harness.expect_silence(Duration::from_millis(400)).await;

    let stats = harness.stop().await;
    assert_eq!(stats.publish.datagrams_sent, 0);
}

#[tokio::test]
async fn test_size_limit_splits_batches_in_order() {
    let limit = 700;
    let harness = Harness::start(PublishMode::Batch, limit, Duration::from_millis(200)).await;

    for id in 1..=8 {
        harness.send(&rttfc(id, "HB-JLT")).await;
    }

    let mut received = Vec::new();
    while received.len() < 8 {
        let payload = harness.recv().await;
        assert!(payload.len() <= limit, "{} > {}", payload.len(), limit);
        let batch: Value = serde_json::from_slice(&payload).unwrap();
        received.extend(ids(&batch));
    }

    let expected: Vec<Value> = (1..=8u64)
        .map(|id| {
            if id % 2 == 0 {
                Value::from(format!("{:08x}", id))
            } else {
                Value::from(id)
            }
        })
        .collect();
    assert_eq!(received, expected);

    let stats = harness.stop().await;
    assert!(stats.publish.datagrams_sent > 1);
}

#[tokio::test]
async fn test_output_is_ascii_with_escapes() {
    let harness = Harness::start(PublishMode::Single, 8192, Duration::from_millis(150)).await;

    harness.send(&rttfc(31, "D-\u{c4}BCD")).await;

    let payload = harness.recv().await;
    assert!(payload.is_ascii());
    let text = String::from_utf8(payload).unwrap();
    assert!(text.contains(r#""reg":"D-\u00c4BCD""#), "{text}");

    harness.stop().await;
}

#[tokio::test]
async fn test_pending_batch_flushed_on_shutdown() {
    let harness = Harness::start(PublishMode::Batch, 8192, Duration::from_secs(3600)).await;

    harness.send(&rttfc(41, "HB-JLT")).await;
    harness.send(&rttfc(43, "HB-JLT")).await;
    // Let the proxy buffer both records
    tokio::time::sleep(Duration::from_millis(200)).await;

    harness.shutdown.cancel();
    let batch = harness.recv_json().await;
    assert_eq!(ids(&batch), vec![Value::from(41), Value::from(43)]);

    let stats = harness.handle.await.unwrap();
    assert_eq!(stats.publish.records_sent, 2);
}
