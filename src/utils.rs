//! Utility functions for binary parsing and offset arithmetic.

use crate::error::{BcdError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// Offset where the cell region starts (after the base block).
pub const CELL_REGION_OFFSET: u32 = 0x1000;

/// Rounds a length up to the next 4-byte boundary.
#[inline]
pub fn align4(len: usize) -> usize {
    (len + 3) & !3
}

/// Reads a BCD name string from raw bytes, trimming trailing null bytes.
///
/// Key and value names in BCD hives are stored as raw single-byte strings
/// without a terminator. Lossy conversion keeps the reader robust against
/// stray non-UTF-8 bytes.
pub fn read_name_string(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .trim_end_matches('\0')
        .to_string()
}

/// Reads a u16 from a byte slice at the given offset.
pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16> {
    if offset + 2 > data.len() {
        return Err(BcdError::TruncatedData {
            offset: offset as u32,
            expected: 2,
            actual: data.len().saturating_sub(offset),
        });
    }

    let mut cursor = Cursor::new(&data[offset..offset + 2]);
    Ok(cursor.read_u16::<LittleEndian>()?)
}

/// Reads a u32 from a byte slice at the given offset.
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    if offset + 4 > data.len() {
        return Err(BcdError::TruncatedData {
            offset: offset as u32,
            expected: 4,
            actual: data.len().saturating_sub(offset),
        });
    }

    let mut cursor = Cursor::new(&data[offset..offset + 4]);
    Ok(cursor.read_u32::<LittleEndian>()?)
}

/// Reads an i32 from a byte slice at the given offset.
pub fn read_i32_le(data: &[u8], offset: usize) -> Result<i32> {
    if offset + 4 > data.len() {
        return Err(BcdError::TruncatedData {
            offset: offset as u32,
            expected: 4,
            actual: data.len().saturating_sub(offset),
        });
    }

    let mut cursor = Cursor::new(&data[offset..offset + 4]);
    Ok(cursor.read_i32::<LittleEndian>()?)
}

/// Reads a u64 from a byte slice at the given offset.
pub fn read_u64_le(data: &[u8], offset: usize) -> Result<u64> {
    if offset + 8 > data.len() {
        return Err(BcdError::TruncatedData {
            offset: offset as u32,
            expected: 8,
            actual: data.len().saturating_sub(offset),
        });
    }

    let mut cursor = Cursor::new(&data[offset..offset + 8]);
    Ok(cursor.read_u64::<LittleEndian>()?)
}

/// Converts a relative cell offset to an absolute hive offset.
///
/// Cell offsets in the hive are relative to the cell region (at 0x1000).
///
/// # Errors
///
/// Returns `BcdError::InvalidFormat` if the offset is negative or the
/// addition would overflow.
#[inline]
pub fn cell_offset_to_absolute(cell_offset: i32) -> Result<u32> {
    if cell_offset < 0 {
        return Err(BcdError::InvalidFormat(format!(
            "Negative cell offset: {}",
            cell_offset
        )));
    }
    (cell_offset as u32)
        .checked_add(CELL_REGION_OFFSET)
        .ok_or_else(|| {
            BcdError::InvalidFormat(format!("Cell offset {:#x} overflows", cell_offset))
        })
}
