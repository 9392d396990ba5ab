//! RTTFC line splitting and conversion to [`TrafficRecord`].

use std::str::FromStr;

use super::error::ParseError;
use super::fields;
use crate::traffic::{
    AircraftType, Attitude, Ident, Position, TrafficId, TrafficRecord, GROUND_VEHICLE_TYPE,
};

/// Literal value of the record type column.
pub const RECORD_TYPE: &str = "RTTFC";

/// Minimum number of CSV fields of a usable record.
pub const MIN_FIELDS: usize = fields::CATEGORY + 1;

/// A validated RTTFC line split into its fields.
///
/// Holds at least [`MIN_FIELDS`] fields and starts with [`RECORD_TYPE`].
#[derive(Debug, Clone)]
pub struct RttfcLine<'a> {
    fields: Vec<&'a str>,
}

impl<'a> RttfcLine<'a> {
    /// Split and validate a line of text.
    ///
    /// A trailing line ending is ignored so that lines read from recordings
    /// behave like datagrams.
    pub fn parse(line: &'a str) -> Result<Self, ParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let cols: Vec<&str> = line.split(',').collect();

        if cols.len() < MIN_FIELDS {
            return Err(ParseError::TooFewFields {
                count: cols.len(),
                min: MIN_FIELDS,
            });
        }
        if cols[fields::REC_TYPE] != RECORD_TYPE {
            return Err(ParseError::WrongRecordType(cols[fields::REC_TYPE].to_string()));
        }

        Ok(Self { fields: cols })
    }

    /// Number of fields in the line.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false, a valid line has at least [`MIN_FIELDS`] fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw text of a field.
    pub fn text(&self, index: usize) -> &'a str {
        self.fields[index]
    }

    /// Raw text of a field, `None` if empty.
    pub fn non_empty(&self, index: usize) -> Option<&'a str> {
        let text = self.fields[index];
        (!text.is_empty()).then_some(text)
    }

    /// Parse a field as a number, surrounding whitespace ignored.
    pub fn number<T: FromStr>(&self, index: usize) -> Result<T, ParseError> {
        self.fields[index]
            .trim()
            .parse()
            .map_err(|_| self.format_error(index))
    }

    /// Parse a field as a finite floating point number.
    pub fn float(&self, index: usize) -> Result<f64, ParseError> {
        let value: f64 = self.number(index)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.format_error(index))
        }
    }

    fn format_error(&self, index: usize) -> ParseError {
        ParseError::FieldFormat {
            index,
            name: fields::name(index),
            value: self.fields[index].to_string(),
        }
    }
}

/// Convert one RTTFC datagram into a traffic record.
pub fn convert(data: &[u8]) -> Result<TrafficRecord, ParseError> {
    let text = std::str::from_utf8(data).map_err(|_| ParseError::InvalidEncoding)?;
    let line = RttfcLine::parse(text)?;

    let id = TrafficId::from_source(line.number(fields::HEXID)?);

    Ok(TrafficRecord {
        id,
        ident: ident(&line),
        aircraft_type: aircraft_type(&line),
        position: position(&line)?,
        attitude: attitude(&line)?,
    })
}

fn ident(line: &RttfcLine<'_>) -> Ident {
    let call = line.non_empty(fields::CS_ICAO);
    let origin = line.text(fields::FROM_IATA);
    let destination = line.text(fields::TO_IATA);

    let label = call
        .filter(|_| !origin.is_empty() || !destination.is_empty())
        .map(|call| {
            format!(
                "{} ({}): {} -> {}",
                call,
                line.text(fields::AC_TYPE),
                origin,
                destination
            )
        });

    Ident {
        reg: line.non_empty(fields::AC_TAILNO).map(str::to_string),
        call: call.map(str::to_string),
        label,
    }
}

fn aircraft_type(line: &RttfcLine<'_>) -> AircraftType {
    let icao = match line.non_empty(fields::AC_TYPE) {
        Some(icao) => Some(icao.to_string()),
        None if fields::GROUND_VEHICLE_CATEGORIES.contains(&line.text(fields::CATEGORY)) => {
            Some(GROUND_VEHICLE_TYPE.to_string())
        }
        None => None,
    };
    AircraftType { icao }
}

fn position(line: &RttfcLine<'_>) -> Result<Position, ParseError> {
    let lat = line.float(fields::LAT)?;
    let lon = line.float(fields::LON)?;

    // Barometric altitude is used as-is, no pressure correction.
    let alt_geom: i64 = line.number(fields::ALT_GEOM)?;
    let alt_geo = if alt_geom >= 0 {
        alt_geom
    } else {
        line.number(fields::ALT_BARO)?
    };

    Ok(Position {
        lat,
        lon,
        alt_geo,
        gnd: line.text(fields::GND) == "1",
        timestamp: line.float(fields::TIMESTAMP)?,
    })
}

fn attitude(line: &RttfcLine<'_>) -> Result<Attitude, ParseError> {
    // Sentinels are compared on the raw text, before any parsing.
    let roll = if line.text(fields::ROLL) != fields::ROLL_UNAVAILABLE {
        Some(line.float(fields::ROLL)?)
    } else {
        None
    };

    let heading = if line.text(fields::TRUE_HEADING) != fields::HEADING_UNAVAILABLE {
        Some(line.float(fields::TRUE_HEADING)?)
    } else if line.text(fields::MAG_HEADING) != fields::HEADING_UNAVAILABLE {
        Some(line.float(fields::MAG_HEADING)?)
    } else {
        None
    };

    Ok(Attitude { roll, heading })
}
