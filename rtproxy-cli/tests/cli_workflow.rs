//! End-to-end tests driving the `rtproxy` binary over loopback UDP.
//!
//! Every test points HOME at a temporary directory so that config and log
//! files never touch the real user profile.

use std::io::{BufRead, BufReader, Write};
use std::net::UdpSocket;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;

const RTTFC_LINE: &str = "RTTFC,4036324,51.4700,-0.4543,0,0,1,0,0,BAW12,A388,G-XLEA,LHR,SIN,\
                          1650000000,0,0,0,82,0,0,0,0,-1.0,270.0,269.5,0,0,A5";

fn command(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rtproxy"));
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn run_cli(home: &Path, args: &[&str]) -> Output {
    command(home)
        .args(args)
        .output()
        .expect("Failed to execute CLI command")
}

/// Assert a command succeeded.
fn assert_success(output: &Output, context: &str) {
    if !output.status.success() {
        panic!(
            "{} failed with {}\nstdout:\n{}\nstderr:\n{}",
            context,
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

fn receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let port = socket.local_addr().unwrap().port();
    (socket, port)
}

fn recv_string(socket: &UdpSocket) -> String {
    let mut buf = [0u8; 65536];
    let len = socket.recv(&mut buf).expect("no datagram received");
    String::from_utf8(buf[..len].to_vec()).unwrap()
}

/// A port that was free a moment ago.
fn free_port() -> u16 {
    UdpSocket::bind("0.0.0.0:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

struct KillOnDrop(Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

#[test]
fn test_send_delivers_datagram() {
    let home = TempDir::new().unwrap();
    let (socket, port) = receiver();

    let output = run_cli(
        home.path(),
        &["send", "hello traffic", "--host", "127.0.0.1", "-p", &port.to_string(), "-v"],
    );
    assert_success(&output, "send");

    assert_eq!(recv_string(&socket), "hello traffic");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello traffic");
}

#[test]
fn test_replay_sends_each_line_of_file() {
    let home = TempDir::new().unwrap();
    let (socket, port) = receiver();

    let recording = home.path().join("traffic.rttfc");
    let mut file = std::fs::File::create(&recording).unwrap();
    writeln!(file, "{}", RTTFC_LINE).unwrap();
    writeln!(file).unwrap();
    writeln!(file, "second record").unwrap();
    drop(file);

    let output = run_cli(
        home.path(),
        &[
            "replay",
            recording.to_str().unwrap(),
            "--host",
            "127.0.0.1",
            "-p",
            &port.to_string(),
        ],
    );
    assert_success(&output, "replay");

    assert_eq!(recv_string(&socket), RTTFC_LINE);
    assert_eq!(recv_string(&socket), "second record");
}

#[test]
fn test_replay_stdin() {
    let home = TempDir::new().unwrap();
    let (socket, port) = receiver();

    let mut child = command(home.path())
        .args(["replay", "--host", "127.0.0.1", "-p", &port.to_string()])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"from stdin\n")
        .unwrap();
    let status = child.wait().unwrap();

    assert!(status.success());
    assert_eq!(recv_string(&socket), "from stdin");
}

#[test]
fn test_replay_loop_requires_file() {
    let home = TempDir::new().unwrap();
    let output = run_cli(home.path(), &["replay", "--loop"]);
    assert!(!output.status.success());
}

#[test]
fn test_config_init_set_get() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.ini");
    let config_arg = config.to_str().unwrap();

    let output = run_cli(home.path(), &["--config", config_arg, "config", "init"]);
    assert_success(&output, "config init");
    assert!(config.exists());

    let output = run_cli(
        home.path(),
        &["--config", config_arg, "config", "set", "publish.mode", "single"],
    );
    assert_success(&output, "config set");

    let output = run_cli(
        home.path(),
        &["--config", config_arg, "config", "get", "publish.mode"],
    );
    assert_success(&output, "config get");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "single");

    let output = run_cli(home.path(), &["--config", config_arg, "config", "list"]);
    assert_success(&output, "config list");
    let listing = String::from_utf8_lossy(&output.stdout);
    assert!(listing.contains("[publish]"));
    assert!(listing.contains("  mode = single"));
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let home = TempDir::new().unwrap();

    let output = run_cli(home.path(), &["config", "set", "publish.ttl", "999"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration error"));

    let output = run_cli(home.path(), &["config", "get", "no.such_key"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_config_path_uses_home() {
    let home = TempDir::new().unwrap();
    let output = run_cli(home.path(), &["config", "path"]);
    assert_success(&output, "config path");

    let expected = home.path().join(".rtproxy").join("config.ini");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        expected.to_str().unwrap()
    );
}

#[test]
fn test_proxy_batches_records_until_idle() {
    let home = TempDir::new().unwrap();
    let (socket, out_port) = receiver();
    let in_port = free_port();

    let child = command(home.path())
        .args([
            "proxy",
            "-f",
            &in_port.to_string(),
            "-a",
            "127.0.0.1",
            "-p",
            &out_port.to_string(),
            "--quiescence-ms",
            "200",
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let mut child = KillOnDrop(child);

    // Wait until the proxy announces that it is listening
    let stdout = child.0.stdout.take().unwrap();
    let mut first_line = String::new();
    BufReader::new(stdout).read_line(&mut first_line).unwrap();
    assert!(first_line.starts_with("Listening"), "{first_line}");

    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    let target = ("127.0.0.1", in_port);
    sender.send_to(RTTFC_LINE.as_bytes(), target).unwrap();
    sender.send_to(b"RTTFC,too,short", target).unwrap();
    sender
        .send_to(RTTFC_LINE.replace("4036324", "4036325").as_bytes(), target)
        .unwrap();

    let batch: Value = serde_json::from_str(&recv_string(&socket)).unwrap();
    let records = batch.as_array().expect("batch is a JSON array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], Value::from("003d96e4"));
    assert_eq!(records[1]["id"], Value::from(4036325));
    assert_eq!(records[0]["ident"]["call"], Value::from("BAW12"));
    assert_eq!(records[0]["position"]["gnd"], Value::Bool(true));
}
