//! Well-known element metadata.
//!
//! Maps the friendly names used by boot-configuration tooling to element
//! type codes and payload kinds. Lookups are case-sensitive on the name.

use crate::guid::Guid;
use crate::store::ElementKind;

/// The well-known boot manager object identifier.
pub const BOOT_MANAGER_ID: Guid = Guid::new(
    0x9dea862c,
    0x5cdd,
    0x4e70,
    [0xac, 0xc1, 0xf3, 0x2b, 0x34, 0x4d, 0x47, 0x95],
);

/// Metadata for a well-known element.
#[derive(Debug, Clone, Copy)]
pub struct ElementInfo {
    /// Friendly name (e.g. "description").
    pub name: &'static str,

    /// Element type code.
    pub id: u32,

    /// Payload kind of the element.
    pub kind: ElementKind,
}

/// Well-known elements, from the boot manager and loader element classes.
pub static ELEMENT_TABLE: &[ElementInfo] = &[
    ElementInfo { name: "description", id: 0x12000004, kind: ElementKind::String },
    ElementInfo { name: "device", id: 0x11000001, kind: ElementKind::String },
    ElementInfo { name: "osdevice", id: 0x21000001, kind: ElementKind::String },
    ElementInfo { name: "path", id: 0x12000002, kind: ElementKind::String },
    ElementInfo { name: "systemroot", id: 0x22000002, kind: ElementKind::String },
    ElementInfo { name: "locale", id: 0x12000005, kind: ElementKind::String },
    ElementInfo { name: "inherit", id: 0x14000003, kind: ElementKind::Binary },
    ElementInfo { name: "recoverysequence", id: 0x24000001, kind: ElementKind::Binary },
    ElementInfo { name: "displayorder", id: 0x24000002, kind: ElementKind::Binary },
    ElementInfo { name: "bootsequence", id: 0x24000003, kind: ElementKind::Binary },
    ElementInfo { name: "toolsdisplayorder", id: 0x24000004, kind: ElementKind::Binary },
    ElementInfo { name: "timeout", id: 0x25000004, kind: ElementKind::Integer },
    ElementInfo { name: "default", id: 0x23000003, kind: ElementKind::Binary },
    ElementInfo { name: "bootdebug", id: 0x26000010, kind: ElementKind::Boolean },
    ElementInfo { name: "bootems", id: 0x26000020, kind: ElementKind::Boolean },
    ElementInfo { name: "ems", id: 0x26000022, kind: ElementKind::Boolean },
    ElementInfo { name: "debug", id: 0x260000E0, kind: ElementKind::Boolean },
];

/// Looks up a well-known element by friendly name (case-sensitive).
pub fn lookup_by_name(name: &str) -> Option<&'static ElementInfo> {
    ELEMENT_TABLE.iter().find(|info| info.name == name)
}

/// Looks up a well-known element by type code.
pub fn lookup_by_id(id: u32) -> Option<&'static ElementInfo> {
    ELEMENT_TABLE.iter().find(|info| info.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let info = lookup_by_name("timeout").unwrap();
        assert_eq!(info.id, 0x25000004);
        assert_eq!(info.kind, ElementKind::Integer);

        let info = lookup_by_name("description").unwrap();
        assert_eq!(info.id, 0x12000004);
        assert_eq!(info.kind, ElementKind::String);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(lookup_by_name("Timeout").is_none());
        assert!(lookup_by_name("DESCRIPTION").is_none());
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(lookup_by_id(0x26000010).unwrap().name, "bootdebug");
        assert_eq!(lookup_by_id(0x260000E0).unwrap().name, "debug");
        assert!(lookup_by_id(0xdeadbeef).is_none());
    }

    #[test]
    fn test_boot_manager_id_text() {
        assert_eq!(
            BOOT_MANAGER_ID.to_string(),
            "{9dea862c-5cdd-4e70-acc1-f32b344d4795}"
        );
    }
}
