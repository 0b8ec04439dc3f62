//! Translation between hive keys/values and store objects/elements.
//!
//! On disk, each immediate subkey of the root is one object, named by its
//! GUID in canonical braced form. Each value under an object key is one
//! element: the value name is the element type code in hexadecimal, and the
//! registry value type selects the payload kind.
//!
//! The loader is deliberately tolerant: a key whose name is not a GUID is
//! skipped, a value whose name is not hex is skipped, and a registry type
//! outside the mapping yields an `Unknown` element. Kinds are derived from
//! registry types alone, so a Boolean element (serialized as `REG_DWORD`)
//! reloads as an Integer carrying 0 or 1.

use crate::cell::RegType;
use crate::error::Result;
use crate::guid::Guid;
use crate::hive::{Hive, Value};
use crate::store::{BcdStore, Element, ElementValue, Object, MAX_BINARY, MAX_STRING_LEN};
use crate::utils::read_u64_le;
use crate::writer::{self, HiveWriter, VK_DATA_OFFSET_FIELD};
use tracing::{debug, warn};

/// Parses a value name as a hexadecimal element type code.
///
/// Any non-empty hex string is accepted regardless of length; digits beyond
/// eight shift out through the top of the accumulator.
fn parse_element_type(name: &str) -> Option<u32> {
    if name.is_empty() {
        return None;
    }
    let mut value: u32 = 0;
    for c in name.chars() {
        value = (value << 4) | c.to_digit(16)?;
    }
    Some(value)
}

/// Maps a hive value to an element, deriving the kind from the registry type.
fn element_from_value(element_type: u32, value: &Value<'_>) -> Element {
    let Some(data) = value.data() else {
        return Element::unknown(element_type);
    };

    match value.reg_type() {
        RegType::String | RegType::ExpandString | RegType::MultiString => {
            // Bounded copy up to the first NUL; a MULTI_SZ effectively
            // contributes only its first string.
            let mut bytes = &data[..data.len().min(MAX_STRING_LEN - 1)];
            if let Some(nul) = bytes.iter().position(|&b| b == 0) {
                bytes = &bytes[..nul];
            }
            Element {
                element_type,
                value: ElementValue::String(String::from_utf8_lossy(bytes).into_owned()),
            }
        }
        RegType::Dword => match value.data_as_u32() {
            Some(v) => Element::integer(element_type, u64::from(v)),
            None => Element::unknown(element_type),
        },
        RegType::Qword => match read_u64_le(&data, 0) {
            Ok(v) => Element::integer(element_type, v),
            Err(_) => Element::unknown(element_type),
        },
        RegType::Binary => {
            let mut bytes = data;
            bytes.truncate(MAX_BINARY);
            Element {
                element_type,
                value: ElementValue::Binary(bytes),
            }
        }
        _ => Element::unknown(element_type),
    }
}

/// Populates a store from a parsed hive.
///
/// The store is reset first. Subkeys whose names are not canonical GUIDs
/// and values whose names are not hexadecimal are skipped; an object whose
/// element ceiling is hit keeps the elements read so far and drops the
/// rest.
///
/// # Errors
///
/// Returns an error if the hive has no resolvable root key or the store's
/// object capacity is exhausted.
pub fn load_from_hive(store: &mut BcdStore, hive: &Hive) -> Result<()> {
    store.reset();
    let root = hive.root_key()?;

    for i in 0..root.subkey_count() {
        let Some(key) = root.subkey_at(i) else {
            continue;
        };

        let id = match Guid::parse(key.name()) {
            Ok(id) => id,
            Err(_) => {
                debug!(name = key.name(), "Skipping subkey without a GUID name");
                continue;
            }
        };

        let mut object = Object::new(id, 0);
        for v in 0..key.value_count() {
            let Some(value) = key.value_at(v) else {
                continue;
            };
            let Some(element_type) = parse_element_type(value.name()) else {
                debug!(name = value.name(), "Skipping value without a hex name");
                continue;
            };

            if object.add_element(element_from_value(element_type, &value)).is_err() {
                warn!(id = %id, "Element capacity reached, dropping remaining values");
                break;
            }
        }

        store.add_object(object)?;
    }

    debug!(objects = store.len(), "Loaded BCD store");
    Ok(())
}

/// Chooses the registry type and data encoding for an element.
fn encode_element(element: &Element) -> (RegType, Vec<u8>) {
    match &element.value {
        ElementValue::String(s) => {
            let mut data = s.as_bytes().to_vec();
            data.push(0);
            (RegType::String, data)
        }
        ElementValue::Boolean(b) => (RegType::Dword, u32::from(*b).to_le_bytes().to_vec()),
        ElementValue::Integer(v) => (RegType::Qword, v.to_le_bytes().to_vec()),
        ElementValue::Binary(d) => (RegType::Binary, d.clone()),
        ElementValue::Unknown => (RegType::Binary, Vec::new()),
    }
}

/// Serializes a store into a hive buffer.
///
/// Emission order per object: each element's vk cell (with out-of-line data
/// directly after the cell that references it), the value list, then the nk
/// cell named by the object's GUID. The root's subkey list, the root nk
/// named "Objects", and the base block follow.
pub fn serialize_to_hive(store: &BcdStore) -> Result<Vec<u8>> {
    let mut hive_writer = HiveWriter::new();
    let mut subkeys: Vec<(i32, String)> = Vec::with_capacity(store.len());

    for object in store.objects() {
        let mut value_offsets = Vec::with_capacity(object.element_count());

        for element in object.elements() {
            let (reg_type, data) = encode_element(element);
            let name = format!("{:08x}", element.element_type);

            let vk_offset = hive_writer.append_cell(&writer::value_payload(&name, reg_type, &data))?;
            if data.len() > 4 {
                let data_offset = hive_writer.append_data(&data)?;
                hive_writer.patch_u32(vk_offset, VK_DATA_OFFSET_FIELD, data_offset as u32);
            }
            value_offsets.push(vk_offset);
        }

        let value_list_offset = if value_offsets.is_empty() {
            -1
        } else {
            hive_writer.append_cell(&writer::value_list_payload(&value_offsets))?
        };

        let key_name = object.id.to_string();
        let nk_offset = hive_writer.append_cell(&writer::key_node_payload(
            &key_name,
            0,
            -1,
            value_offsets.len() as u32,
            value_list_offset,
        ))?;
        subkeys.push((nk_offset, key_name));
    }

    let entries: Vec<(i32, &str)> = subkeys
        .iter()
        .map(|(offset, name)| (*offset, name.as_str()))
        .collect();
    let subkey_list_offset = hive_writer.append_cell(&writer::subkey_list_payload(&entries))?;

    let root_offset = hive_writer.append_cell(&writer::key_node_payload(
        "Objects",
        store.len() as u16,
        subkey_list_offset,
        0,
        -1,
    ))?;

    debug!(objects = store.len(), "Serialized BCD store");
    hive_writer.finish(root_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_element_type() {
        assert_eq!(parse_element_type("11000001"), Some(0x11000001));
        assert_eq!(parse_element_type("25000004"), Some(0x25000004));
        assert_eq!(parse_element_type("ff"), Some(0xff));
        assert_eq!(parse_element_type("FF"), Some(0xff));
        assert_eq!(parse_element_type(""), None);
        assert_eq!(parse_element_type("boot"), None);
    }

    #[test]
    fn test_parse_element_type_overlong_wraps() {
        // Digits beyond eight shift out through the top
        assert_eq!(parse_element_type("123456789"), Some(0x23456789));
    }

    #[test]
    fn test_encode_string_appends_nul() {
        let element = Element::string(0x12000004, "A").unwrap();
        let (reg_type, data) = encode_element(&element);
        assert_eq!(reg_type, RegType::String);
        assert_eq!(data, b"A\0");
    }

    #[test]
    fn test_encode_boolean_as_dword() {
        let (reg_type, data) = encode_element(&Element::boolean(0x26000010, true));
        assert_eq!(reg_type, RegType::Dword);
        assert_eq!(data, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_encode_integer_as_qword() {
        let (reg_type, data) = encode_element(&Element::integer(0x25000004, 30));
        assert_eq!(reg_type, RegType::Qword);
        assert_eq!(data, 30u64.to_le_bytes().to_vec());
    }

    #[test]
    fn test_encode_unknown_as_empty_binary() {
        let (reg_type, data) = encode_element(&Element::unknown(0x99000001));
        assert_eq!(reg_type, RegType::Binary);
        assert!(data.is_empty());
    }
}
