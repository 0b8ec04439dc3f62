//! Hive container access with memory-mapped file support.

use crate::error::{BcdError, Result};
use crate::header::{BaseBlock, BASE_BLOCK_SIZE};
use crate::key::KeyNode;
use crate::subkey_list::SubkeyList;
use crate::utils::cell_offset_to_absolute;
use crate::value::ValueKey;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, instrument};

/// A parsed BCD hive.
///
/// The hive owns its backing buffer (memory-mapped or in-memory) and hands
/// out [`Key`] and [`Value`] handles that borrow from it. The reader is
/// strictly read-only; handles stay valid for the hive's lifetime.
///
/// Per-cell lookups return `Option` rather than an error: a cell whose
/// offset, size, or name bounds do not fit the buffer is simply not
/// resolvable, and the caller decides whether to skip or bail.
pub struct Hive {
    /// Hive data - either memory-mapped or owned.
    data: HiveData,

    /// Parsed base block header.
    base_block: BaseBlock,
}

/// Represents hive data storage.
enum HiveData {
    /// Memory-mapped file data.
    Mapped(Mmap),
    /// Owned data.
    Owned(Vec<u8>),
}

impl HiveData {
    fn as_slice(&self) -> &[u8] {
        match self {
            HiveData::Mapped(mmap) => mmap,
            HiveData::Owned(data) => data,
        }
    }
}

impl Hive {
    /// Opens a BCD hive file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is smaller than the
    /// base block, lacks the `"regf"` magic, or has an unresolvable root
    /// key cell.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Opening BCD hive");
        let file = File::open(&path)?;

        // Validate file size before creating the memory map
        let file_size = file.metadata()?.len() as usize;
        if file_size < BASE_BLOCK_SIZE {
            return Err(BcdError::HiveTooSmall {
                size: file_size,
                minimum: BASE_BLOCK_SIZE,
            });
        }

        // SAFETY: the file is opened read-only, its size has been validated
        // against the base block minimum, the mapping's lifetime is tied to
        // the Hive, and all access goes through bounds-checked cell reads.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(size = mmap.len(), "Memory mapped hive file");

        Self::from_data(HiveData::Mapped(mmap))
    }

    /// Creates a hive from an owned byte buffer.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        Self::from_data(HiveData::Owned(data))
    }

    fn from_data(data: HiveData) -> Result<Self> {
        let base_block = BaseBlock::parse(data.as_slice())?;
        Ok(Self { data, base_block })
    }

    /// Returns a reference to the base block header.
    pub fn base_block(&self) -> &BaseBlock {
        &self.base_block
    }

    /// Returns the full hive buffer.
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Returns the root key of the hive.
    ///
    /// # Errors
    ///
    /// Returns a format error if the root key cell cannot be resolved or
    /// parsed; unlike per-item lookups, a hive without a valid root is not
    /// usable at all.
    pub fn root_key(&self) -> Result<Key<'_>> {
        let offset = self.base_block.root_cell_offset;
        debug!(offset = %format!("{:#x}", offset), "Accessing root key");
        self.get_key(offset).ok_or_else(|| {
            BcdError::InvalidFormat(format!("Root key cell at {:#x} is not resolvable", offset))
        })
    }

    /// Gets a key by its signed cell offset.
    ///
    /// Returns `None` if the cell is out of bounds or does not parse as a
    /// key node. Subkey and value offset lists are resolved eagerly; a list
    /// cell that fails its own bounds checks yields a key with zero
    /// reachable entries.
    pub fn get_key(&self, offset: i32) -> Option<Key<'_>> {
        let payload = self.cell_payload(offset)?;
        let node = KeyNode::parse(payload, offset as u32).ok()?;

        let subkey_offsets = if node.has_subkeys() {
            match self
                .cell_payload(node.subkey_list_offset)
                .and_then(|list| SubkeyList::parse(list, node.subkey_list_offset as u32).ok())
            {
                Some(list) => list.offsets,
                None => Vec::new(),
            }
        } else {
            Vec::new()
        };

        let value_offsets = if node.has_values() {
            self.read_value_list(node.value_list_offset, node.value_count as usize)
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        Some(Key {
            hive: self,
            offset,
            node,
            subkey_offsets,
            value_offsets,
        })
    }

    /// Reads a value list cell: `count` packed 4-byte signed offsets.
    fn read_value_list(&self, offset: i32, count: usize) -> Option<Vec<i32>> {
        let payload = self.cell_payload(offset)?;
        if payload.len() < count * 4 {
            return None;
        }
        let mut offsets = Vec::with_capacity(count);
        for i in 0..count {
            offsets.push(i32::from_le_bytes([
                payload[i * 4],
                payload[i * 4 + 1],
                payload[i * 4 + 2],
                payload[i * 4 + 3],
            ]));
        }
        Some(offsets)
    }

    /// Resolves a cell and returns its payload (bytes after the size field).
    ///
    /// A negative size marks an allocated cell, a positive one a free cell;
    /// either is accepted and `abs(size)` bounds the cell.
    fn cell_payload(&self, offset: i32) -> Option<&[u8]> {
        let abs_offset = cell_offset_to_absolute(offset).ok()? as usize;
        let data = self.data.as_slice();

        if abs_offset + 4 > data.len() {
            return None;
        }

        let size = i32::from_le_bytes([
            data[abs_offset],
            data[abs_offset + 1],
            data[abs_offset + 2],
            data[abs_offset + 3],
        ]);
        let abs_size = size.unsigned_abs() as usize;

        if abs_size < 4 || abs_offset + abs_size > data.len() {
            return None;
        }

        Some(&data[abs_offset + 4..abs_offset + abs_size])
    }

    /// Reads out-of-line value data at the given cell-region offset.
    ///
    /// The writer emits raw data bytes without a cell wrapper, so the size
    /// comes from the value record, not from the region itself.
    fn read_value_data(&self, data_offset: u32, data_size: u32) -> Option<&[u8]> {
        let start = cell_offset_to_absolute(i32::try_from(data_offset).ok()?).ok()? as usize;
        let end = start.checked_add(data_size as usize)?;
        let data = self.data.as_slice();
        if end > data.len() {
            return None;
        }
        Some(&data[start..end])
    }
}

/// A key in a BCD hive, borrowing from its [`Hive`].
pub struct Key<'a> {
    hive: &'a Hive,
    /// Signed cell offset of this key.
    pub offset: i32,
    node: KeyNode,
    subkey_offsets: Vec<i32>,
    value_offsets: Vec<i32>,
}

impl<'a> Key<'a> {
    /// Returns the key name.
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Returns the number of reachable subkeys.
    pub fn subkey_count(&self) -> usize {
        self.subkey_offsets.len()
    }

    /// Returns the subkey at the given index, if resolvable.
    pub fn subkey_at(&self, index: usize) -> Option<Key<'a>> {
        let offset = *self.subkey_offsets.get(index)?;
        self.hive.get_key(offset)
    }

    /// Finds an immediate subkey by exact name.
    pub fn find_subkey(&self, name: &str) -> Option<Key<'a>> {
        (0..self.subkey_count())
            .filter_map(|i| self.subkey_at(i))
            .find(|k| k.name() == name)
    }

    /// Returns the number of reachable values.
    pub fn value_count(&self) -> usize {
        self.value_offsets.len()
    }

    /// Returns the value at the given index, if resolvable.
    pub fn value_at(&self, index: usize) -> Option<Value<'a>> {
        let offset = *self.value_offsets.get(index)?;
        let payload = self.hive.cell_payload(offset)?;
        let vk = ValueKey::parse(payload, offset as u32).ok()?;
        Some(Value {
            hive: self.hive,
            vk,
        })
    }
}

/// A value in a BCD hive, borrowing from its [`Hive`].
pub struct Value<'a> {
    hive: &'a Hive,
    vk: ValueKey,
}

impl<'a> Value<'a> {
    /// Returns the value name.
    pub fn name(&self) -> &str {
        &self.vk.name
    }

    /// Returns the registry value type.
    pub fn reg_type(&self) -> crate::cell::RegType {
        self.vk.reg_type
    }

    /// Returns the size of the value data in bytes.
    pub fn data_size(&self) -> u32 {
        self.vk.data_size
    }

    /// Returns the value data bytes.
    ///
    /// Returns `None` for empty data and for out-of-line data that does not
    /// fit the hive buffer.
    pub fn data(&self) -> Option<Vec<u8>> {
        if self.vk.data_size == 0 {
            return None;
        }
        if self.vk.is_inline_data() {
            return Some(self.vk.inline_data());
        }
        self.hive
            .read_value_data(self.vk.data_offset, self.vk.data_size)
            .map(|d| d.to_vec())
    }

    /// Reads the first four data bytes as a little-endian u32.
    pub fn data_as_u32(&self) -> Option<u32> {
        let data = self.data()?;
        if data.len() < 4 {
            return None;
        }
        Some(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::REGF_SIGNATURE;

    fn empty_hive_buf() -> Vec<u8> {
        let mut buf = vec![0u8; BASE_BLOCK_SIZE];
        buf[0..4].copy_from_slice(REGF_SIGNATURE);
        buf[0x24..0x28].copy_from_slice(&0i32.to_le_bytes());
        buf
    }

    #[test]
    fn test_open_rejects_short_buffer() {
        let result = Hive::from_vec(vec![0u8; 100]);
        assert!(matches!(result, Err(BcdError::HiveTooSmall { .. })));
    }

    #[test]
    fn test_open_rejects_bad_magic() {
        let mut buf = vec![0u8; BASE_BLOCK_SIZE];
        buf[0..4].copy_from_slice(b"MZ\x90\x00");
        let result = Hive::from_vec(buf);
        assert!(matches!(result, Err(BcdError::InvalidSignature { .. })));
    }

    #[test]
    fn test_root_key_unresolvable() {
        // Valid header, but the root cell points past the buffer
        let hive = Hive::from_vec(empty_hive_buf()).unwrap();
        assert!(hive.root_key().is_err());
    }

    #[test]
    fn test_cell_size_exceeding_buffer() {
        let mut buf = empty_hive_buf();
        // One cell at region offset 0 claiming more space than exists
        buf.extend_from_slice(&(-64i32).to_le_bytes());
        buf.extend_from_slice(&[0u8; 8]);
        let hive = Hive::from_vec(buf).unwrap();
        assert!(hive.get_key(0).is_none());
    }

    #[test]
    fn test_undersized_cell_rejected() {
        let mut buf = empty_hive_buf();
        buf.extend_from_slice(&(-2i32).to_le_bytes());
        buf.extend_from_slice(&[0u8; 64]);
        let hive = Hive::from_vec(buf).unwrap();
        assert!(hive.get_key(0).is_none());
    }
}
