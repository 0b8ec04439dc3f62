//! Subkey list ("lf") cell parsing.
//!
//! BCD hives organize a key's immediate subkeys in a fast-leaf list: the
//! "lf" signature, a 16-bit entry count, and the entries. Full-form entries
//! are 8 bytes (offset + 4-byte name hint); a simplified writer variant
//! emits bare 4-byte offsets. Both are accepted on read.

use crate::error::{BcdError, Result};
use crate::utils::read_i32_le;

/// Offset of the entry count in the list payload.
const COUNT_OFFSET: usize = 0x02;

/// Offset of the first entry in the list payload.
const ENTRIES_OFFSET: usize = 0x04;

/// Parsed subkey list.
#[derive(Debug, Clone)]
pub struct SubkeyList {
    /// Signed cell offsets of the member key nodes.
    pub offsets: Vec<i32>,
}

impl SubkeyList {
    /// Parses a subkey list from cell payload bytes.
    ///
    /// The full 8-byte entry form is preferred when it fits the payload;
    /// otherwise the 4-byte offsets-only form is tried.
    ///
    /// # Arguments
    ///
    /// * `data` - Cell payload (after the size field, starting with "lf").
    /// * `offset` - Cell offset for error reporting.
    pub fn parse(data: &[u8], offset: u32) -> Result<Self> {
        if data.len() < ENTRIES_OFFSET {
            return Err(BcdError::TruncatedData {
                offset,
                expected: ENTRIES_OFFSET,
                actual: data.len(),
            });
        }

        if &data[0..2] != b"lf" {
            return Err(BcdError::InvalidFormat(format!(
                "Expected 'lf' signature at offset {:#x}",
                offset
            )));
        }

        let count = u16::from_le_bytes([data[COUNT_OFFSET], data[COUNT_OFFSET + 1]]) as usize;

        let entry_size = if ENTRIES_OFFSET + count * 8 <= data.len() {
            8
        } else if ENTRIES_OFFSET + count * 4 <= data.len() {
            4
        } else {
            return Err(BcdError::TruncatedData {
                offset,
                expected: ENTRIES_OFFSET + count * 4,
                actual: data.len(),
            });
        };

        let mut offsets = Vec::with_capacity(count);
        for i in 0..count {
            offsets.push(read_i32_le(data, ENTRIES_OFFSET + i * entry_size)?);
        }

        Ok(SubkeyList { offsets })
    }

    /// Returns the number of entries in this list.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns true if this list is empty.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wide_entries() {
        // lf, 2 entries of (offset, hint)
        let mut data = vec![0u8; 4 + 2 * 8];
        data[0..2].copy_from_slice(b"lf");
        data[2..4].copy_from_slice(&2u16.to_le_bytes());
        data[4..8].copy_from_slice(&0x20i32.to_le_bytes());
        data[8..12].copy_from_slice(b"{9de");
        data[12..16].copy_from_slice(&0x80i32.to_le_bytes());
        data[16..20].copy_from_slice(b"{000");

        let list = SubkeyList::parse(&data, 0).unwrap();
        assert_eq!(list.offsets, vec![0x20, 0x80]);
    }

    #[test]
    fn test_parse_narrow_entries() {
        // Simplified variant: bare offsets only
        let mut data = vec![0u8; 4 + 2 * 4];
        data[0..2].copy_from_slice(b"lf");
        data[2..4].copy_from_slice(&2u16.to_le_bytes());
        data[4..8].copy_from_slice(&0x20i32.to_le_bytes());
        data[8..12].copy_from_slice(&0x80i32.to_le_bytes());

        let list = SubkeyList::parse(&data, 0).unwrap();
        assert_eq!(list.offsets, vec![0x20, 0x80]);
    }

    #[test]
    fn test_parse_empty_list() {
        let mut data = vec![0u8; 4];
        data[0..2].copy_from_slice(b"lf");

        let list = SubkeyList::parse(&data, 0).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_count_overflowing_payload() {
        let mut data = vec![0u8; 8];
        data[0..2].copy_from_slice(b"lf");
        data[2..4].copy_from_slice(&100u16.to_le_bytes());
        assert!(SubkeyList::parse(&data, 0).is_err());
    }

    #[test]
    fn test_invalid_signature() {
        let mut data = vec![0u8; 8];
        data[0..2].copy_from_slice(b"ri");
        assert!(SubkeyList::parse(&data, 0).is_err());
    }
}
