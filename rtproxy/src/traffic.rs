//! XPPTraffic record model.
//!
//! A [`TrafficRecord`] is the unit published to the multicast group, either
//! alone or as an element of a JSON array. Its serialized shape is:
//!
//! ```text
//! {
//!   "id": 4711 | "00001266",
//!   "ident":    { "reg": "D-EVEL", "call": "DLH1234", "label": "DLH1234 (A320): FRA -> HAM" },
//!   "type":     { "icao": "A320" },
//!   "position": { "lat": 51.4, "lon": 6.9, "alt_geo": 407, "gnd": true, "timestamp": 1650000000.5 },
//!   "attitude": { "roll": -0.2, "heading": 42.0 }
//! }
//! ```
//!
//! Only `id` and `position` are always present. Empty sub-objects are left out.

use serde::Serialize;

/// ICAO type designator used for ground service vehicles (categories C1/C2).
pub const GROUND_VEHICLE_TYPE: &str = "ZZZC";

/// Aircraft identifier.
///
/// Even source ids are published as 8-digit lowercase hex strings, odd ones as
/// plain numbers, so that consumers see both representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TrafficId {
    /// Zero-padded lowercase hex string, e.g. `"00000004"`.
    Hex(String),
    /// Plain numeric id.
    Numeric(u64),
}

impl TrafficId {
    /// Choose the representation for a numeric source id by its parity.
    pub fn from_source(id: u64) -> Self {
        if id % 2 == 0 {
            TrafficId::Hex(format!("{:08x}", id))
        } else {
            TrafficId::Numeric(id)
        }
    }
}

/// Identification of the aircraft.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ident {
    /// Registration (tail number).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg: Option<String>,
    /// Callsign.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call: Option<String>,
    /// Display label, `"{call} ({icao}): {origin} -> {destination}"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Ident {
    pub fn is_empty(&self) -> bool {
        self.reg.is_none() && self.call.is_none() && self.label.is_none()
    }
}

/// Aircraft type information.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AircraftType {
    /// ICAO aircraft type designator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icao: Option<String>,
}

impl AircraftType {
    pub fn is_empty(&self) -> bool {
        self.icao.is_none()
    }
}

/// Position of the aircraft. Always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude in feet, geometric if known, otherwise uncorrected barometric.
    pub alt_geo: i64,
    /// On-ground flag.
    pub gnd: bool,
    /// Unix epoch timestamp in seconds.
    pub timestamp: f64,
}

/// Attitude of the aircraft.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attitude {
    /// Roll in degrees, negative is left.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<f64>,
    /// Heading in degrees, true if available, otherwise magnetic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

impl Attitude {
    pub fn is_empty(&self) -> bool {
        self.roll.is_none() && self.heading.is_none()
    }
}

/// One converted traffic state update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficRecord {
    pub id: TrafficId,
    #[serde(skip_serializing_if = "Ident::is_empty")]
    pub ident: Ident,
    #[serde(rename = "type", skip_serializing_if = "AircraftType::is_empty")]
    pub aircraft_type: AircraftType,
    pub position: Position,
    #[serde(skip_serializing_if = "Attitude::is_empty")]
    pub attitude: Attitude,
}
