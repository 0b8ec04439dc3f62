//! Value record ("vk") cell parsing.

use crate::cell::RegType;
use crate::error::{BcdError, Result};
use crate::utils::{read_name_string, read_u16_le, read_u32_le};

/// Minimum payload size of a value record in bytes (fixed region before name).
pub const VALUE_KEY_MIN_SIZE: usize = 0x14;

/// Offset of the value name in the value record payload.
const VALUE_NAME_OFFSET: usize = 0x14;

/// Value record (vk) structure.
///
/// Data of 4 bytes or less is stored inline in place of the data-offset
/// field; larger data lives in a separate region of the cell area.
#[derive(Debug, Clone)]
pub struct ValueKey {
    /// Length of value name in bytes.
    pub name_length: u16,

    /// Length of value data in bytes.
    pub data_size: u32,

    /// Offset to value data, or the data itself when `data_size <= 4`.
    pub data_offset: u32,

    /// Registry value type.
    pub reg_type: RegType,

    /// Value name.
    pub name: String,
}

impl ValueKey {
    /// Parses a value record from cell payload bytes.
    ///
    /// # Arguments
    ///
    /// * `data` - Cell payload (after the size field, starting with "vk").
    /// * `offset` - Cell offset for error reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is truncated, the signature is not
    /// "vk", or the name overruns the payload.
    pub fn parse(data: &[u8], offset: u32) -> Result<Self> {
        if data.len() < VALUE_KEY_MIN_SIZE {
            return Err(BcdError::TruncatedData {
                offset,
                expected: VALUE_KEY_MIN_SIZE,
                actual: data.len(),
            });
        }

        if &data[0..2] != b"vk" {
            return Err(BcdError::InvalidFormat(format!(
                "Expected 'vk' signature at offset {:#x}",
                offset
            )));
        }

        let name_length = read_u16_le(data, 0x02)?;
        let data_size = read_u32_le(data, 0x04)?;
        let data_offset = read_u32_le(data, 0x08)?;
        let reg_type = RegType::from_u32(read_u32_le(data, 0x0c)?);

        let name_end = VALUE_NAME_OFFSET + name_length as usize;
        if name_end > data.len() {
            return Err(BcdError::TruncatedData {
                offset,
                expected: name_end,
                actual: data.len(),
            });
        }

        let name = read_name_string(&data[VALUE_NAME_OFFSET..name_end]);

        Ok(ValueKey {
            name_length,
            data_size,
            data_offset,
            reg_type,
            name,
        })
    }

    /// Returns true if the data is stored inline in the data-offset field.
    pub fn is_inline_data(&self) -> bool {
        self.data_size <= 4
    }

    /// Extracts inline data (when `data_size <= 4`).
    ///
    /// The bytes sit in the data-offset field in their natural order.
    pub fn inline_data(&self) -> Vec<u8> {
        let bytes = self.data_offset.to_le_bytes();
        bytes[..self.data_size.min(4) as usize].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_key_minimum_size() {
        let data = vec![0u8; VALUE_KEY_MIN_SIZE - 1];
        assert!(ValueKey::parse(&data, 0).is_err());
    }

    #[test]
    fn test_value_key_invalid_signature() {
        let mut data = vec![0u8; 0x18];
        data[0..2].copy_from_slice(b"XX");
        assert!(ValueKey::parse(&data, 0).is_err());
    }

    #[test]
    fn test_value_key_name_overflow() {
        let mut data = vec![0u8; 0x18];
        data[0..2].copy_from_slice(b"vk");
        data[0x02..0x04].copy_from_slice(&32u16.to_le_bytes());
        assert!(ValueKey::parse(&data, 0).is_err());
    }

    #[test]
    fn test_inline_data() {
        let mut data = vec![0u8; 0x1c];
        data[0..2].copy_from_slice(b"vk");
        data[0x02..0x04].copy_from_slice(&8u16.to_le_bytes());
        data[0x04..0x08].copy_from_slice(&4u32.to_le_bytes());
        data[0x08..0x0c].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        data[0x0c..0x10].copy_from_slice(&3u32.to_le_bytes());
        data[0x14..0x1c].copy_from_slice(b"26000010");

        let vk = ValueKey::parse(&data, 0).unwrap();
        assert!(vk.is_inline_data());
        assert_eq!(vk.inline_data(), vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(vk.reg_type, RegType::Binary);
        assert_eq!(vk.name, "26000010");
    }

    #[test]
    fn test_partial_inline_data() {
        let mut data = vec![0u8; VALUE_KEY_MIN_SIZE];
        data[0..2].copy_from_slice(b"vk");
        data[0x04..0x08].copy_from_slice(&2u32.to_le_bytes());
        data[0x08..0x0c].copy_from_slice(&[0xaa, 0xbb, 0x00, 0x00]);

        let vk = ValueKey::parse(&data, 0).unwrap();
        assert_eq!(vk.inline_data(), vec![0xaa, 0xbb]);
    }
}
