//! RealTraffic RTTFC parsing and conversion.
//!
//! RTTFC is the CSV sentence RealTraffic broadcasts on UDP port 49005, one
//! aircraft state per datagram:
//!
//! ```text
//! RTTFC,hexid,lat,lon,baro_alt,baro_rate,gnd,track,gsp,cs_icao,ac_type,ac_tailno,
//!       from_iata,to_iata,timestamp,source,cs_iata,msg_type,alt_geom,ias,tas,mach,
//!       track_rate,roll,mag_heading,true_heading,geom_rate,emergency,category,...
//! ```
//!
//! [`convert`] turns one such line into a [`TrafficRecord`](crate::traffic::TrafficRecord).
//! Rejections are reported as [`ParseError`] and never abort the caller.

mod error;
pub mod fields;
mod parser;

pub use error::ParseError;
pub use parser::{convert, RttfcLine, MIN_FIELDS, RECORD_TYPE};
