//! Named key ("nk") cell parsing.

use crate::error::{BcdError, Result};
use crate::utils::{read_i32_le, read_name_string, read_u16_le, read_u32_le};

/// Minimum payload size of a key node in bytes (fixed region before name).
pub const KEY_NODE_MIN_SIZE: usize = 0x48;

/// Offset of the key name in the key node payload.
const KEY_NAME_OFFSET: usize = 0x48;

/// Key node (nk) structure.
///
/// The BCD subset carries only subkey/value bookkeeping and the name; the
/// remaining fixed-region fields (timestamps, security, class names) are
/// zero in writer output and ignored on read.
#[derive(Debug, Clone)]
pub struct KeyNode {
    /// Stored subkey count (legacy field; the subkey list is authoritative).
    pub subkey_count: u16,

    /// Signed offset to the subkey list cell, or -1.
    pub subkey_list_offset: i32,

    /// Number of values.
    pub value_count: u32,

    /// Signed offset to the value list cell, or -1.
    pub value_list_offset: i32,

    /// Length of key name in bytes.
    pub name_length: u16,

    /// Key name.
    pub name: String,
}

impl KeyNode {
    /// Parses a key node from cell payload bytes.
    ///
    /// # Arguments
    ///
    /// * `data` - Cell payload (after the size field, starting with "nk").
    /// * `offset` - Cell offset for error reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is truncated, the signature is not
    /// "nk", or the name overruns the payload.
    pub fn parse(data: &[u8], offset: u32) -> Result<Self> {
        if data.len() < KEY_NODE_MIN_SIZE {
            return Err(BcdError::TruncatedData {
                offset,
                expected: KEY_NODE_MIN_SIZE,
                actual: data.len(),
            });
        }

        if &data[0..2] != b"nk" {
            return Err(BcdError::InvalidFormat(format!(
                "Expected 'nk' signature at offset {:#x}",
                offset
            )));
        }

        let subkey_count = read_u16_le(data, 0x10)?;
        let subkey_list_offset = read_i32_le(data, 0x18)?;
        let value_count = read_u32_le(data, 0x20)?;
        let value_list_offset = read_i32_le(data, 0x24)?;
        let name_length = read_u16_le(data, 0x44)?;

        let name_end = KEY_NAME_OFFSET + name_length as usize;
        if name_end > data.len() {
            return Err(BcdError::TruncatedData {
                offset,
                expected: name_end,
                actual: data.len(),
            });
        }

        let name = read_name_string(&data[KEY_NAME_OFFSET..name_end]);

        Ok(KeyNode {
            subkey_count,
            subkey_list_offset,
            value_count,
            value_list_offset,
            name_length,
            name,
        })
    }

    /// Returns true if this key has subkeys.
    pub fn has_subkeys(&self) -> bool {
        self.subkey_count > 0
    }

    /// Returns true if this key has values.
    pub fn has_values(&self) -> bool {
        self.value_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_key_node(name: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; KEY_NODE_MIN_SIZE + name.len()];
        data[0..2].copy_from_slice(b"nk");
        data[0x18..0x1c].copy_from_slice(&(-1i32).to_le_bytes());
        data[0x24..0x28].copy_from_slice(&(-1i32).to_le_bytes());
        data[0x44..0x46].copy_from_slice(&(name.len() as u16).to_le_bytes());
        data[KEY_NAME_OFFSET..].copy_from_slice(name);
        data
    }

    #[test]
    fn test_key_node_minimum_size() {
        let data = vec![0u8; KEY_NODE_MIN_SIZE - 1];
        assert!(KeyNode::parse(&data, 0).is_err());
    }

    #[test]
    fn test_key_node_invalid_signature() {
        let mut data = vec![0u8; 0x50];
        data[0..2].copy_from_slice(b"XX");
        assert!(KeyNode::parse(&data, 0).is_err());
    }

    #[test]
    fn test_key_node_name_overflow() {
        let mut data = raw_key_node(b"Objects");
        // Claim a name longer than the payload
        data[0x44..0x46].copy_from_slice(&100u16.to_le_bytes());
        assert!(KeyNode::parse(&data, 0).is_err());
    }

    #[test]
    fn test_key_node_parse() {
        let data = raw_key_node(b"Objects");
        let key = KeyNode::parse(&data, 0).unwrap();
        assert_eq!(key.name, "Objects");
        assert_eq!(key.subkey_count, 0);
        assert_eq!(key.subkey_list_offset, -1);
        assert_eq!(key.value_count, 0);
        assert_eq!(key.value_list_offset, -1);
    }
}
