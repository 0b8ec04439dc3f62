//! BCD object identifiers.
//!
//! Every object in a BCD store is identified by a 128-bit GUID. The
//! canonical textual form is `{xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx}`:
//! exactly 38 characters including braces, lowercase hex on output, either
//! case accepted on input.

use crate::error::{BcdError, Result};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Length of the canonical textual form, braces included.
pub const GUID_TEXT_LEN: usize = 38;

/// A 128-bit object identifier in the 4-2-2-1-1-6 field layout.
///
/// Equality is field-wise. The layout matches the on-disk key-name encoding
/// used by BCD hives, not a byte-order-neutral UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Guid {
    /// First 32-bit field.
    pub data1: u32,

    /// Second 16-bit field.
    pub data2: u16,

    /// Third 16-bit field.
    pub data3: u16,

    /// Trailing 8 bytes.
    pub data4: [u8; 8],
}

fn hex_nibble(byte: u8) -> Option<u32> {
    (byte as char).to_digit(16)
}

fn parse_hex_field(text: &[u8]) -> Option<u32> {
    let mut value = 0u32;
    for &b in text {
        value = (value << 4) | hex_nibble(b)?;
    }
    Some(value)
}

fn parse_hex_byte(text: &[u8]) -> Option<u8> {
    parse_hex_field(&text[..2]).map(|v| v as u8)
}

impl Guid {
    /// Creates a GUID from its four fields.
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Parses a GUID from its canonical textual form.
    ///
    /// The input must be exactly 38 characters: a leading `{`, a trailing
    /// `}`, and dashes at positions 9, 14, 19, and 24. Hex digits are
    /// accepted in either case.
    ///
    /// # Errors
    ///
    /// Returns `BcdError::InvalidGuid` on any format violation.
    pub fn parse(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != GUID_TEXT_LEN || bytes[0] != b'{' || bytes[37] != b'}' {
            return Err(BcdError::InvalidGuid(text.to_string()));
        }
        if bytes[9] != b'-' || bytes[14] != b'-' || bytes[19] != b'-' || bytes[24] != b'-' {
            return Err(BcdError::InvalidGuid(text.to_string()));
        }

        let invalid = || BcdError::InvalidGuid(text.to_string());

        let data1 = parse_hex_field(&bytes[1..9]).ok_or_else(invalid)?;
        let data2 = parse_hex_field(&bytes[10..14]).ok_or_else(invalid)? as u16;
        let data3 = parse_hex_field(&bytes[15..19]).ok_or_else(invalid)? as u16;

        let mut data4 = [0u8; 8];
        data4[0] = parse_hex_byte(&bytes[20..22]).ok_or_else(invalid)?;
        data4[1] = parse_hex_byte(&bytes[22..24]).ok_or_else(invalid)?;
        for i in 0..6 {
            data4[2 + i] = parse_hex_byte(&bytes[25 + i * 2..27 + i * 2]).ok_or_else(invalid)?;
        }

        Ok(Self {
            data1,
            data2,
            data3,
            data4,
        })
    }

    /// Generates a fresh identifier from the given random source.
    ///
    /// The top bit of `data1` is cleared, so generated identifiers never
    /// collide with the Microsoft-reserved range above `0x7FFFFFFF`. No
    /// cryptographic strength is required of the source.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut data4 = [0u8; 8];
        rng.fill(&mut data4);
        Self {
            data1: rng.gen::<u32>() & 0x7FFF_FFFF,
            data2: rng.gen(),
            data3: rng.gen(),
            data4,
        }
    }

    /// Generates a fresh identifier from the thread-local random source.
    pub fn random() -> Self {
        Self::generate(&mut rand::thread_rng())
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}}}",
            self.data1,
            self.data2,
            self.data3,
            self.data4[0],
            self.data4[1],
            self.data4[2],
            self.data4[3],
            self.data4[4],
            self.data4[5],
            self.data4[6],
            self.data4[7]
        )
    }
}

impl FromStr for Guid {
    type Err = BcdError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
