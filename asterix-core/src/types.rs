//! Shared error types and byte helpers for asterix-core.

use std::fmt;

use serde::Serializer;
use thiserror::Error;

/// All errors produced by asterix-core.
#[derive(Debug, Error)]
pub enum AsterixError {
    #[error("buffer truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("undersized data block: declared {declared} bytes, {available} available")]
    Undersized { declared: usize, available: usize },
    #[error("category {0} unknown or not processed")]
    CategoryUnknown(u8),
    #[error("data field unknown for FRN {0}")]
    DatafieldUnknown(u8),
    #[error("length indicator {0} is shorter than the indicator itself")]
    BadLength(u16),
    #[error("FSPEC flags FRN {0}, past the last addressable FRN 255")]
    FrnOverflow(usize),
    #[error("data block of {0} bytes does not fit its 16-bit length field")]
    Oversized(usize),
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AsterixError>;

/// A decode failure that still carries whatever was decoded before it.
///
/// `unread` counts the bytes left unconsumed in the slice handed to the
/// failing call, at the moment it failed.
#[derive(Debug, Error)]
#[error("{error} ({unread} bytes unread)")]
pub struct DecodeFailure<T: fmt::Debug> {
    pub partial: T,
    pub unread: usize,
    #[source]
    pub error: AsterixError,
}

impl<T: fmt::Debug> DecodeFailure<T> {
    pub fn new(partial: T, unread: usize, error: AsterixError) -> Self {
        DecodeFailure {
            partial,
            unread,
            error,
        }
    }

    /// Drop the partial result, keeping only the underlying error.
    pub fn into_error(self) -> AsterixError {
        self.error
    }
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

/// Decode a hex string into bytes. Case-insensitive; whitespace anywhere in
/// the input is ignored so captures can be grouped for readability.
pub fn hex_decode(hex: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(AsterixError::InvalidHex(format!(
            "odd number of digits ({})",
            digits.len()
        )));
    }
    let mut bytes = Vec::with_capacity(digits.len() / 2);
    for chunk in digits.chunks(2) {
        let (Some(high), Some(low)) = (hex_digit(chunk[0]), hex_digit(chunk[1])) else {
            return Err(AsterixError::InvalidHex(
                String::from_utf8_lossy(chunk).into_owned(),
            ));
        };
        bytes.push((high << 4) | low);
    }
    Ok(bytes)
}

/// Encode bytes as a lowercase hex string.
pub fn hex_encode(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for &b in data {
        s.push(HEX_CHARS[(b >> 4) as usize] as char);
        s.push(HEX_CHARS[(b & 0x0F) as usize] as char);
    }
    s
}

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Serialize a byte buffer as a lowercase hex string.
pub(crate) fn serialize_hex<S: Serializer>(data: &[u8], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex_encode(data))
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Interpret the low `bits` bits of `value` as a two's complement integer.
///
/// Many ASTERIX subfields pack signed quantities into odd widths (12, 14,
/// 24 bits); this sign-extends them without caring about the field layout.
pub fn twos_complement(bits: u8, value: u64) -> i64 {
    match bits {
        0 => 0,
        64..=u8::MAX => value as i64,
        _ => {
            let shift = 64 - bits as u32;
            ((value << shift) as i64) >> shift
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_decode() {
        assert_eq!(hex_decode("300185").unwrap(), vec![0x30, 0x01, 0x85]);
        assert_eq!(hex_decode("30 01 85").unwrap(), vec![0x30, 0x01, 0x85]);
        assert_eq!(hex_decode("FfD7").unwrap(), vec![0xff, 0xd7]);
        assert!(hex_decode("").unwrap().is_empty());
    }

    #[test]
    fn test_hex_decode_invalid() {
        assert!(matches!(hex_decode("abc"), Err(AsterixError::InvalidHex(_))));
        assert!(matches!(hex_decode("zz"), Err(AsterixError::InvalidHex(_))));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x04, 0xff, 0xff, 0xfe]), "04fffffe");
        assert_eq!(hex_encode(&[]), "");
    }

    #[test]
    fn test_twos_complement() {
        assert_eq!(twos_complement(16, 0xFFFF), -1);
        assert_eq!(twos_complement(16, 0x7FFF), 32767);
        assert_eq!(twos_complement(24, 0x80_0000), -8_388_608);
        assert_eq!(twos_complement(12, 0x7FF), 2047);
        assert_eq!(twos_complement(12, 0xFFF), -1);
        // Bits above the width are ignored.
        assert_eq!(twos_complement(8, 0x1FF), -1);
        assert_eq!(twos_complement(0, 0xFF), 0);
    }

    #[test]
    fn test_decode_failure_display() {
        let failure = DecodeFailure::new((), 7, AsterixError::CategoryUnknown(255));
        assert_eq!(
            failure.to_string(),
            "category 255 unknown or not processed (7 bytes unread)"
        );
        assert!(matches!(
            failure.into_error(),
            AsterixError::CategoryUnknown(255)
        ));
    }
}
