//! Hive serialization primitives.
//!
//! [`HiveWriter`] builds a hive buffer cell by cell: a reserved 4096-byte
//! base block followed by the cell region. Every cell is emitted with a
//! negated (allocated) size header and padded to a 4-byte boundary. Cell
//! offsets handed back to the caller are region-relative, the same
//! convention the reader resolves against (`file position = 0x1000 +
//! offset`).
//!
//! Out-of-line value data is appended as raw bytes without a cell wrapper.
//! The reader of this crate sizes such data from the value record, so the
//! output is self-consistent, but it is not bit-compatible with Microsoft
//! hives for values larger than 4 bytes.

use crate::cell::RegType;
use crate::error::{BcdError, Result};
use crate::header::{BaseBlock, BASE_BLOCK_SIZE};
use crate::utils::{align4, CELL_REGION_OFFSET};
use std::io;

/// Payload offset of the data-offset field inside a vk cell.
pub const VK_DATA_OFFSET_FIELD: usize = 0x08;

/// Fixed payload region of an nk cell before the name.
const NK_FIXED_SIZE: usize = 0x48;

/// Fixed payload region of a vk cell before the name.
const VK_FIXED_SIZE: usize = 0x14;

/// Incremental hive buffer writer.
pub struct HiveWriter {
    buf: Vec<u8>,
}

impl HiveWriter {
    /// Creates a writer with a zeroed base block reserved.
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; BASE_BLOCK_SIZE],
        }
    }

    /// Current cell-region offset of the end of the buffer, after alignment.
    fn end_offset(&mut self) -> Result<i32> {
        while self.buf.len() % 4 != 0 {
            self.buf.push(0);
        }
        let region = self.buf.len() - BASE_BLOCK_SIZE;
        i32::try_from(region).map_err(|_| {
            BcdError::Io(io::Error::new(
                io::ErrorKind::OutOfMemory,
                "hive cell region exceeds 2 GiB",
            ))
        })
    }

    /// Appends an allocated cell holding `payload` and returns its offset.
    ///
    /// The emitted size header is the negated total cell size, which
    /// includes the header itself and trailing padding.
    pub fn append_cell(&mut self, payload: &[u8]) -> Result<i32> {
        let offset = self.end_offset()?;
        let start = self.buf.len();
        let cell_size = align4(payload.len() + 4);

        self.buf.extend_from_slice(&(-(cell_size as i32)).to_le_bytes());
        self.buf.extend_from_slice(payload);
        self.buf.resize(start + cell_size, 0);
        Ok(offset)
    }

    /// Appends raw out-of-line value data and returns its offset.
    pub fn append_data(&mut self, data: &[u8]) -> Result<i32> {
        let offset = self.end_offset()?;
        self.buf.extend_from_slice(data);
        Ok(offset)
    }

    /// Overwrites a u32 field inside an already-emitted cell's payload.
    pub fn patch_u32(&mut self, cell_offset: i32, payload_offset: usize, value: u32) {
        let pos = CELL_REGION_OFFSET as usize + cell_offset as usize + 4 + payload_offset;
        self.buf[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Finalizes the buffer: writes the base block and pads to 4 bytes.
    pub fn finish(mut self, root_cell_offset: i32) -> Result<Vec<u8>> {
        self.end_offset()?;
        BaseBlock::write_into(&mut self.buf, root_cell_offset)?;
        Ok(self.buf)
    }
}

impl Default for HiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds an nk cell payload.
///
/// `subkey_count` fills the legacy 16-bit count field; list offsets are -1
/// when the key has no subkey or value list cell.
pub fn key_node_payload(
    name: &str,
    subkey_count: u16,
    subkey_list_offset: i32,
    value_count: u32,
    value_list_offset: i32,
) -> Vec<u8> {
    let name_bytes = name.as_bytes();
    let mut payload = vec![0u8; NK_FIXED_SIZE + name_bytes.len()];

    payload[0..2].copy_from_slice(b"nk");
    payload[0x10..0x12].copy_from_slice(&subkey_count.to_le_bytes());
    payload[0x18..0x1c].copy_from_slice(&subkey_list_offset.to_le_bytes());
    payload[0x20..0x24].copy_from_slice(&value_count.to_le_bytes());
    payload[0x24..0x28].copy_from_slice(&value_list_offset.to_le_bytes());
    payload[0x44..0x46].copy_from_slice(&(name_bytes.len() as u16).to_le_bytes());
    payload[NK_FIXED_SIZE..].copy_from_slice(name_bytes);
    payload
}

/// Builds a vk cell payload.
///
/// Data of 4 bytes or less is placed inline in the data-offset field.
/// Larger data must be appended separately and its offset patched in at
/// [`VK_DATA_OFFSET_FIELD`]; the field is left zero here.
pub fn value_payload(name: &str, reg_type: RegType, data: &[u8]) -> Vec<u8> {
    let name_bytes = name.as_bytes();
    let mut payload = vec![0u8; VK_FIXED_SIZE + name_bytes.len()];

    payload[0..2].copy_from_slice(b"vk");
    payload[0x02..0x04].copy_from_slice(&(name_bytes.len() as u16).to_le_bytes());
    payload[0x04..0x08].copy_from_slice(&(data.len() as u32).to_le_bytes());
    if data.len() <= 4 {
        payload[0x08..0x08 + data.len()].copy_from_slice(data);
    }
    payload[0x0c..0x10].copy_from_slice(&reg_type.as_u32().to_le_bytes());
    payload[VK_FIXED_SIZE..].copy_from_slice(name_bytes);
    payload
}

/// Builds an lf cell payload from key offsets and their names.
///
/// Entries use the full 8-byte form: offset plus the first four name bytes
/// as the hint.
pub fn subkey_list_payload(entries: &[(i32, &str)]) -> Vec<u8> {
    let mut payload = vec![0u8; 4 + entries.len() * 8];
    payload[0..2].copy_from_slice(b"lf");
    payload[2..4].copy_from_slice(&(entries.len() as u16).to_le_bytes());

    for (i, (offset, name)) in entries.iter().enumerate() {
        let pos = 4 + i * 8;
        payload[pos..pos + 4].copy_from_slice(&offset.to_le_bytes());
        let mut hint = [0u8; 4];
        let name_bytes = name.as_bytes();
        let n = name_bytes.len().min(4);
        hint[..n].copy_from_slice(&name_bytes[..n]);
        payload[pos + 4..pos + 8].copy_from_slice(&hint);
    }
    payload
}

/// Builds a value list payload: packed 4-byte signed offsets, no header.
pub fn value_list_payload(offsets: &[i32]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(offsets.len() * 4);
    for offset in offsets {
        payload.extend_from_slice(&offset.to_le_bytes());
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_cell_offset_is_zero() {
        let mut w = HiveWriter::new();
        let off = w.append_cell(&[0xaa; 8]).unwrap();
        assert_eq!(off, 0);
    }

    #[test]
    fn test_cell_size_header_negated_and_aligned() {
        let mut w = HiveWriter::new();
        w.append_cell(&[0xaa; 5]).unwrap();
        let buf = w.finish(0).unwrap();

        // 5-byte payload + 4-byte header rounds up to 12
        let size = i32::from_le_bytes([
            buf[0x1000],
            buf[0x1001],
            buf[0x1002],
            buf[0x1003],
        ]);
        assert_eq!(size, -12);
        assert_eq!(buf.len() % 4, 0);
    }

    #[test]
    fn test_consecutive_cells_are_aligned() {
        let mut w = HiveWriter::new();
        let a = w.append_cell(&[1u8; 3]).unwrap();
        let b = w.append_cell(&[2u8; 3]).unwrap();
        assert_eq!(a % 4, 0);
        assert_eq!(b % 4, 0);
        assert!(b > a);
    }

    #[test]
    fn test_patch_u32() {
        let mut w = HiveWriter::new();
        let payload = value_payload("12000004", crate::cell::RegType::String, &[0u8; 10]);
        let off = w.append_cell(&payload).unwrap();
        w.patch_u32(off, VK_DATA_OFFSET_FIELD, 0xdeadbeef);
        let buf = w.finish(0).unwrap();

        let field = 0x1000 + off as usize + 4 + VK_DATA_OFFSET_FIELD;
        assert_eq!(&buf[field..field + 4], &0xdeadbeefu32.to_le_bytes());
    }

    #[test]
    fn test_value_payload_inline() {
        let payload = value_payload("25000004", crate::cell::RegType::Dword, &[30, 0, 0, 0]);
        assert_eq!(&payload[0x08..0x0c], &[30, 0, 0, 0]);
        assert_eq!(&payload[0x04..0x08], &4u32.to_le_bytes());
    }

    #[test]
    fn test_key_node_payload_layout() {
        let payload = key_node_payload("Objects", 3, 0x100, 0, -1);
        assert_eq!(&payload[0..2], b"nk");
        assert_eq!(&payload[0x10..0x12], &3u16.to_le_bytes());
        assert_eq!(&payload[0x18..0x1c], &0x100i32.to_le_bytes());
        assert_eq!(&payload[0x24..0x28], &(-1i32).to_le_bytes());
        assert_eq!(&payload[0x44..0x46], &7u16.to_le_bytes());
        assert_eq!(&payload[0x48..], b"Objects");
    }

    #[test]
    fn test_subkey_list_payload_hints() {
        let payload = subkey_list_payload(&[(0x20, "{9dea862c-...}")]);
        assert_eq!(&payload[0..2], b"lf");
        assert_eq!(&payload[2..4], &1u16.to_le_bytes());
        assert_eq!(&payload[4..8], &0x20i32.to_le_bytes());
        assert_eq!(&payload[8..12], b"{9de");
    }
}
