//! Column indices of the RTTFC sentence (0-based).
//!
//! Only the columns the converter reads are listed.

/// Record type, always `"RTTFC"`.
pub const REC_TYPE: usize = 0;
/// Transponder hex code, converted to decimal.
pub const HEXID: usize = 1;
/// Latitude in degrees.
pub const LAT: usize = 2;
/// Longitude in degrees.
pub const LON: usize = 3;
/// Barometric altitude in feet, not adapted for local pressure.
pub const ALT_BARO: usize = 4;
/// Ground flag, `"1"` when on the ground.
pub const GND: usize = 6;
/// ICAO callsign.
pub const CS_ICAO: usize = 9;
/// ICAO aircraft type.
pub const AC_TYPE: usize = 10;
/// Registration.
pub const AC_TAILNO: usize = 11;
/// Origin airport.
pub const FROM_IATA: usize = 12;
/// Destination airport.
pub const TO_IATA: usize = 13;
/// Unix epoch timestamp of the last update.
pub const TIMESTAMP: usize = 14;
/// Geometric (GPS) altitude in feet, negative if unknown.
pub const ALT_GEOM: usize = 18;
/// Roll in degrees, negative is left.
pub const ROLL: usize = 23;
/// Magnetic heading.
pub const MAG_HEADING: usize = 24;
/// True heading.
pub const TRUE_HEADING: usize = 25;
/// Emitter category, `C1`/`C2` are ground service vehicles.
pub const CATEGORY: usize = 28;

/// Raw text of an unavailable roll value.
pub const ROLL_UNAVAILABLE: &str = "-1.0";
/// Raw text of an unavailable heading value.
pub const HEADING_UNAVAILABLE: &str = "-1.00";

/// Categories converted to the ground vehicle type.
pub const GROUND_VEHICLE_CATEGORIES: [&str; 2] = ["C1", "C2"];

/// Human-readable column name for diagnostics.
pub fn name(index: usize) -> &'static str {
    match index {
        REC_TYPE => "record type",
        HEXID => "hexid",
        LAT => "latitude",
        LON => "longitude",
        ALT_BARO => "barometric altitude",
        GND => "ground flag",
        CS_ICAO => "callsign",
        AC_TYPE => "aircraft type",
        AC_TAILNO => "registration",
        FROM_IATA => "origin",
        TO_IATA => "destination",
        TIMESTAMP => "timestamp",
        ALT_GEOM => "geometric altitude",
        ROLL => "roll",
        MAG_HEADING => "magnetic heading",
        TRUE_HEADING => "true heading",
        CATEGORY => "category",
        _ => "unknown",
    }
}
