//! INI serialization logic for converting `ConfigFile` → INI string.

use super::keys::path_to_display;
use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[listen]
; UDP port on which RTTFC datagrams are received (default: 49005)
port = {}

[publish]
; Destination host or multicast group for XPPTraffic JSON (default: 239.255.1.1)
; A unicast address such as 127.0.0.1 also works
address = {}
; Destination UDP port (default: 49900)
port = {}
; Multicast time-to-live, 0-255 (default: 8). Ignored for unicast destinations
ttl = {}
; Largest JSON array sent in one datagram, in bytes (default: 8192)
; A single record that is larger than this is sent on its own
max_datagram_size = {}
; Datagram packing (default: batch)
;   batch  - collect records into JSON arrays
;   single - one JSON object per datagram
mode = {}
; Input silence in milliseconds after which a pending batch is sent (default: 500)
quiescence_ms = {}
; Print every outgoing datagram to stdout (default: false)
verbose = {}

[logging]
; Log file location (default: ~/.rtproxy/rtproxy.log)
file = {}
"#,
        config.listen.port,
        config.publish.address,
        config.publish.port,
        config.publish.ttl,
        config.publish.max_datagram_size,
        config.publish.mode,
        config.publish.quiescence_ms,
        config.publish.verbose,
        path_to_display(&config.logging.file),
    )
}
