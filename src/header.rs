//! Hive base block (header) parsing and emission.
//!
//! The base block is the first 4096 bytes (0x1000) of a hive file. BCD
//! stores only rely on the `"regf"` magic and the signed root key offset at
//! 0x24; the writer leaves every other header field zeroed.

use crate::error::{BcdError, Result};
use crate::utils::read_i32_le;

/// Size of the base block in bytes.
pub const BASE_BLOCK_SIZE: usize = 4096;

/// Expected signature for a valid hive ("regf").
pub const REGF_SIGNATURE: &[u8; 4] = b"regf";

/// Offset of the root key cell offset field in the base block.
const ROOT_OFFSET_FIELD: usize = 0x24;

/// Hive base block header.
///
/// Only the fields the BCD codec uses are retained; the rest of the 4096
/// bytes is opaque padding on read and zeroes on write.
#[derive(Debug, Clone)]
pub struct BaseBlock {
    /// Signature, should be "regf".
    pub signature: [u8; 4],

    /// Signed offset to the root key cell, relative to the cell region.
    pub root_cell_offset: i32,
}

impl BaseBlock {
    /// Parses a base block from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is smaller than 4096 bytes or the
    /// signature is not `"regf"`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < BASE_BLOCK_SIZE {
            return Err(BcdError::HiveTooSmall {
                size: data.len(),
                minimum: BASE_BLOCK_SIZE,
            });
        }

        let mut signature = [0u8; 4];
        signature.copy_from_slice(&data[0..4]);

        if &signature != REGF_SIGNATURE {
            return Err(BcdError::invalid_signature(REGF_SIGNATURE, &signature));
        }

        let root_cell_offset = read_i32_le(data, ROOT_OFFSET_FIELD)?;

        Ok(BaseBlock {
            signature,
            root_cell_offset,
        })
    }

    /// Writes the magic and root offset into a zeroed base block buffer.
    ///
    /// The caller supplies the first 4096 bytes of the output hive; all
    /// bytes not written here stay zero.
    pub fn write_into(buf: &mut [u8], root_cell_offset: i32) -> Result<()> {
        if buf.len() < BASE_BLOCK_SIZE {
            return Err(BcdError::HiveTooSmall {
                size: buf.len(),
                minimum: BASE_BLOCK_SIZE,
            });
        }

        buf[0..4].copy_from_slice(REGF_SIGNATURE);
        buf[ROOT_OFFSET_FIELD..ROOT_OFFSET_FIELD + 4]
            .copy_from_slice(&root_cell_offset.to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_block_size() {
        assert_eq!(BASE_BLOCK_SIZE, 4096);
    }

    #[test]
    fn test_invalid_signature() {
        let mut data = vec![0u8; BASE_BLOCK_SIZE];
        data[0..4].copy_from_slice(b"XXXX");

        let result = BaseBlock::parse(&data);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            BcdError::InvalidSignature { .. }
        ));
    }

    #[test]
    fn test_too_small() {
        let data = vec![0u8; 100];
        let result = BaseBlock::parse(&data);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), BcdError::HiveTooSmall { .. }));
    }

    #[test]
    fn test_write_then_parse() {
        let mut data = vec![0u8; BASE_BLOCK_SIZE];
        BaseBlock::write_into(&mut data, 0x20).unwrap();

        let block = BaseBlock::parse(&data).unwrap();
        assert_eq!(&block.signature, b"regf");
        assert_eq!(block.root_cell_offset, 0x20);
    }
}
