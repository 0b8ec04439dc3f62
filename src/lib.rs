//! # Windows BCD Store Codec
//!
//! A reader and writer for Windows Boot Configuration Data (BCD) stores.
//! A BCD store is a registry hive file (the "regf" on-disk format) whose
//! key/value tree encodes boot-related configuration objects - boot
//! manager, OS loader entries, resume objects, inheritance templates -
//! each identified by a GUID and carrying typed elements keyed by a 32-bit
//! element type code.
//!
//! ## Architecture
//!
//! The crate is built as two layers plus a mapper between them:
//!
//! 1. **Hive codec**: base block, cells, key nodes (nk), value records
//!    (vk), subkey lists (lf), value lists, and out-of-line data with the
//!    inline ≤4-byte optimization. The [`Hive`] reader is bounds-checked
//!    everywhere and read-only; [`writer::HiveWriter`] emits the same
//!    subset.
//! 2. **BCD data model**: [`BcdStore`], [`Object`], [`Element`] - the
//!    in-memory representation with insertion-order iteration and bounded
//!    capacities.
//! 3. **Mapper**: [`load_from_hive`] and [`serialize_to_hive`] translate
//!    between the two, encoding GUIDs as key names and element type codes
//!    as hexadecimal value names.
//!
//! ## Binary Layout
//!
//! BCD hives follow this structure:
//!
//! ```text
//! [Base Block - 4KB]
//!   - Signature: "regf"
//!   - Root key cell offset at 0x24
//!
//! [Cell Region]
//!   [Cell Size - 4 bytes, negative if allocated]
//!   [Cell Data]
//!     - Key nodes (nk): one per object, named by GUID
//!     - Value records (vk): one per element, named by hex type code
//!     - Subkey list (lf), value lists, out-of-line value data
//! ```
//!
//! ## Examples
//!
//! ### Building and round-tripping a store
//!
//! ```rust
//! use bcd_store::{
//!     load_from_hive, serialize_to_hive, BcdStore, Element, Guid, Hive, Object,
//!     OBJECT_TYPE_BOOTMGR,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = BcdStore::new();
//!
//! let id = Guid::parse("{9dea862c-5cdd-4e70-acc1-f32b344d4795}")?;
//! let mut bootmgr = Object::new(id, OBJECT_TYPE_BOOTMGR);
//! bootmgr.set_element(Element::string(0x12000004, "Windows Boot Manager")?)?;
//! bootmgr.set_element(Element::integer(0x25000004, 30))?;
//! store.set_object(bootmgr)?;
//!
//! let bytes = serialize_to_hive(&store)?;
//! assert_eq!(&bytes[0..4], b"regf");
//!
//! let hive = Hive::from_vec(bytes)?;
//! let mut reloaded = BcdStore::new();
//! load_from_hive(&mut reloaded, &hive)?;
//! assert_eq!(reloaded.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading an existing store file
//!
//! ```no_run
//! use bcd_store::{load_from_hive, BcdStore, Hive};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let hive = Hive::open("BCD")?;
//! let mut store = BcdStore::new();
//! load_from_hive(&mut store, &hive)?;
//!
//! for object in store.objects() {
//!     println!("{} ({} elements)", object.id, object.element_count());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod elements;
pub mod error;
pub mod guid;
pub mod header;
pub mod hive;
pub mod key;
pub mod mapper;
pub mod store;
pub mod subkey_list;
pub mod utils;
pub mod value;
pub mod writer;

// Re-export main types for convenience
pub use cell::{CellType, RegType};
pub use elements::{lookup_by_id, lookup_by_name, ElementInfo, BOOT_MANAGER_ID, ELEMENT_TABLE};
pub use error::{BcdError, Result};
pub use guid::{Guid, GUID_TEXT_LEN};
pub use header::BaseBlock;
pub use hive::{Hive, Key, Value};
pub use key::KeyNode;
pub use mapper::{load_from_hive, serialize_to_hive};
pub use store::{
    BcdStore, Element, ElementKind, ElementValue, Object, MAX_BINARY,
    MAX_ELEMENTS_PER_OBJECT, MAX_OBJECTS, MAX_STRING_LEN, OBJECT_TYPE_BOOTMGR,
    OBJECT_TYPE_INHERITANCE, OBJECT_TYPE_OSLOADER, OBJECT_TYPE_RESUME,
};
pub use subkey_list::SubkeyList;
pub use value::ValueKey;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
