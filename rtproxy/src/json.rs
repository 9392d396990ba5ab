//! ASCII-safe JSON encoding.
//!
//! Datagrams leave the proxy as pure ASCII: every non-ASCII character in a
//! string is written as a `\uXXXX` escape (UTF-16 surrogate pairs for
//! characters outside the BMP). The output is otherwise compact
//! `serde_json` output.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

/// Compact formatter that escapes non-ASCII string content.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }

        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Serialize `value` to ASCII-only JSON bytes.
pub fn to_ascii_vec<T>(value: &T) -> Result<Vec<u8>, serde_json::Error>
where
    T: ?Sized + Serialize,
{
    let mut buffer = Vec::with_capacity(256);
    let mut serializer = Serializer::with_formatter(&mut buffer, AsciiFormatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Serialize `value` to an ASCII-only JSON string.
pub fn to_ascii_string<T>(value: &T) -> Result<String, serde_json::Error>
where
    T: ?Sized + Serialize,
{
    let bytes = to_ascii_vec(value)?;
    // Only ASCII is ever written.
    Ok(bytes.into_iter().map(char::from).collect())
}
