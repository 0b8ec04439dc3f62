//! Store and identifier semantics, including property-based GUID checks.

use bcd_store::{BcdError, BcdStore, Element, ElementValue, Guid, Object};
use proptest::prelude::*;

#[test]
fn guid_round_trip_well_known() {
    let text = "{9dea862c-5cdd-4e70-acc1-f32b344d4795}";
    let id = Guid::parse(text).unwrap();

    assert_eq!(id.data1, 0x9dea862c);
    assert_eq!(id.data2, 0x5cdd);
    assert_eq!(id.data3, 0x4e70);
    assert_eq!(id.data4, [0xac, 0xc1, 0xf3, 0x2b, 0x34, 0x4d, 0x47, 0x95]);

    assert_eq!(id.to_string(), text);
}

#[test]
fn guid_parse_rejects_malformed() {
    for text in [
        "9dea862c-5cdd-4e70-acc1-f32b344d4795",    // missing braces
        "{9dea862c-5cdd-4e70-acc1-f32b344d47}",    // short
        "{9deag862c-5cdd-4e70-acc1-f32b344d4795}", // non-hex
    ] {
        assert!(
            matches!(Guid::parse(text), Err(BcdError::InvalidGuid(_))),
            "expected parse failure for {:?}",
            text
        );
    }
}

#[test]
fn single_object_add_and_remove_element() {
    let id = Guid::parse("{00000001-0002-0003-0405-060708090a0b}").unwrap();
    let mut object = Object::new(id, 0);
    object
        .add_element(Element::integer(0x25000004, 30))
        .unwrap();

    let element = object.find_element(0x25000004).unwrap();
    assert_eq!(element.value, ElementValue::Integer(30));

    object.remove_element(0x25000004).unwrap();
    assert!(matches!(
        object.remove_element(0x25000004),
        Err(BcdError::NotFound(_))
    ));
}

#[test]
fn set_element_updates_in_place() {
    let id = Guid::parse("{00000001-0002-0003-0405-060708090a0b}").unwrap();
    let mut object = Object::new(id, 0);
    object
        .add_element(Element::string(0x12000004, "A").unwrap())
        .unwrap();

    object
        .set_element(Element::string(0x12000004, "B").unwrap())
        .unwrap();

    assert_eq!(object.element_count(), 1);
    assert_eq!(
        object.find_element(0x12000004).unwrap().value,
        ElementValue::String("B".to_string())
    );
}

#[test]
fn store_find_is_by_field_equality() {
    let mut store = BcdStore::new();
    let id = Guid::new(0x1234, 0x56, 0x78, [1, 2, 3, 4, 5, 6, 7, 8]);
    store.add_object(Object::new(id, 0)).unwrap();

    let same = Guid::new(0x1234, 0x56, 0x78, [1, 2, 3, 4, 5, 6, 7, 8]);
    assert!(store.find_object(&same).is_some());

    let different = Guid::new(0x1234, 0x56, 0x78, [1, 2, 3, 4, 5, 6, 7, 9]);
    assert!(store.find_object(&different).is_none());
}

fn arb_guid() -> impl Strategy<Value = Guid> {
    (any::<u32>(), any::<u16>(), any::<u16>(), any::<[u8; 8]>())
        .prop_map(|(data1, data2, data3, data4)| Guid::new(data1, data2, data3, data4))
}

proptest! {
    #[test]
    fn guid_format_parse_round_trip(id in arb_guid()) {
        let text = id.to_string();
        let parsed = Guid::parse(&text).unwrap();
        prop_assert_eq!(parsed, id);
    }

    #[test]
    fn guid_format_is_canonical(id in arb_guid()) {
        let text = id.to_string();
        let bytes = text.as_bytes();

        prop_assert_eq!(bytes.len(), 38);
        prop_assert_eq!(bytes[0], b'{');
        prop_assert_eq!(bytes[37], b'}');
        for pos in [9usize, 14, 19, 24] {
            prop_assert_eq!(bytes[pos], b'-');
        }
        for (i, &b) in bytes.iter().enumerate() {
            if i == 0 || i == 37 || matches!(i, 9 | 14 | 19 | 24) {
                continue;
            }
            prop_assert!(
                b.is_ascii_digit() || (b'a'..=b'f').contains(&b),
                "non-lowercase-hex byte {:?} at {}",
                b as char,
                i
            );
        }
    }

    #[test]
    fn guid_parse_rejects_truncations(id in arb_guid(), cut in 0usize..38) {
        let text = id.to_string();
        prop_assert!(Guid::parse(&text[..cut]).is_err());
    }
}
