//! In-memory BCD store data model.
//!
//! A store is an ordered collection of objects; each object carries a GUID
//! identity, a Microsoft-defined application type code, and an ordered set
//! of typed elements. Containers are value-like: cloning a store deep-copies
//! everything, and capacity ceilings surface as [`BcdError::CapacityExceeded`].

use crate::error::{BcdError, Result};
use crate::guid::Guid;

/// Maximum number of objects in a store.
pub const MAX_OBJECTS: usize = 128;

/// Maximum number of elements per object.
pub const MAX_ELEMENTS_PER_OBJECT: usize = 32;

/// Maximum string element size in bytes, including the NUL terminator.
pub const MAX_STRING_LEN: usize = 256;

/// Maximum binary element size in bytes.
pub const MAX_BINARY: usize = 1024;

/// Application type of a boot manager object.
pub const OBJECT_TYPE_BOOTMGR: u32 = 0x10100002;

/// Application type of an OS loader entry.
pub const OBJECT_TYPE_OSLOADER: u32 = 0x10200003;

/// Application type of a resume-from-hibernation object.
pub const OBJECT_TYPE_RESUME: u32 = 0x10300006;

/// Application type of an inheritance template.
pub const OBJECT_TYPE_INHERITANCE: u32 = 0x12000004;

/// Discriminant of an element's payload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    /// Payload could not be classified.
    Unknown,

    /// 64-bit unsigned integer.
    Integer,

    /// UTF-8 string.
    String,

    /// Logical flag.
    Boolean,

    /// Opaque byte sequence.
    Binary,
}

/// Tagged element payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementValue {
    /// No payload.
    Unknown,

    /// 64-bit unsigned integer.
    Integer(u64),

    /// UTF-8 string, at most [`MAX_STRING_LEN`] − 1 bytes.
    String(String),

    /// Logical flag.
    Boolean(bool),

    /// Byte sequence, at most [`MAX_BINARY`] bytes.
    Binary(Vec<u8>),
}

impl ElementValue {
    /// Returns the kind discriminant of this payload.
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementValue::Unknown => ElementKind::Unknown,
            ElementValue::Integer(_) => ElementKind::Integer,
            ElementValue::String(_) => ElementKind::String,
            ElementValue::Boolean(_) => ElementKind::Boolean,
            ElementValue::Binary(_) => ElementKind::Binary,
        }
    }
}

/// A typed attribute of a BCD object, keyed by a 32-bit element type code.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    /// Element type code (e.g. `0x25000004` for the boot menu timeout).
    pub element_type: u32,

    /// Tagged payload.
    pub value: ElementValue,
}

impl Element {
    /// Creates an integer element.
    pub fn integer(element_type: u32, value: u64) -> Self {
        Self {
            element_type,
            value: ElementValue::Integer(value),
        }
    }

    /// Creates a boolean element.
    pub fn boolean(element_type: u32, value: bool) -> Self {
        Self {
            element_type,
            value: ElementValue::Boolean(value),
        }
    }

    /// Creates a string element.
    ///
    /// # Errors
    ///
    /// Returns a capacity error if the string exceeds
    /// [`MAX_STRING_LEN`] − 1 bytes.
    pub fn string(element_type: u32, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.len() > MAX_STRING_LEN - 1 {
            return Err(BcdError::capacity("string element", MAX_STRING_LEN - 1));
        }
        Ok(Self {
            element_type,
            value: ElementValue::String(value),
        })
    }

    /// Creates a binary element.
    ///
    /// # Errors
    ///
    /// Returns a capacity error if the payload exceeds [`MAX_BINARY`] bytes.
    pub fn binary(element_type: u32, value: Vec<u8>) -> Result<Self> {
        if value.len() > MAX_BINARY {
            return Err(BcdError::capacity("binary element", MAX_BINARY));
        }
        Ok(Self {
            element_type,
            value: ElementValue::Binary(value),
        })
    }

    /// Creates an element with no classified payload.
    pub fn unknown(element_type: u32) -> Self {
        Self {
            element_type,
            value: ElementValue::Unknown,
        }
    }

    /// Returns the kind discriminant of this element's payload.
    pub fn kind(&self) -> ElementKind {
        self.value.kind()
    }
}

/// A single BCD entity (boot manager, OS loader, ...) with its elements.
///
/// Element insertion order is preserved and observable through
/// [`Object::elements`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Object {
    /// Object identifier.
    pub id: Guid,

    /// Microsoft-defined application type code.
    pub object_type: u32,

    elements: Vec<Element>,
}

impl Object {
    /// Creates an object with no elements.
    pub fn new(id: Guid, object_type: u32) -> Self {
        Self {
            id,
            object_type,
            elements: Vec::new(),
        }
    }

    /// Returns the elements in insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Returns the number of elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Appends an element without checking type uniqueness.
    ///
    /// [`Object::set_element`] is the enforcement point for one element per
    /// type; this method is the raw append underneath it.
    ///
    /// # Errors
    ///
    /// Returns a capacity error once [`MAX_ELEMENTS_PER_OBJECT`] is reached;
    /// the object is unchanged on failure.
    pub fn add_element(&mut self, element: Element) -> Result<()> {
        if self.elements.len() >= MAX_ELEMENTS_PER_OBJECT {
            return Err(BcdError::capacity(
                "elements per object",
                MAX_ELEMENTS_PER_OBJECT,
            ));
        }
        self.elements.push(element);
        Ok(())
    }

    /// Finds the first element with the given type code.
    pub fn find_element(&self, element_type: u32) -> Option<&Element> {
        self.elements
            .iter()
            .find(|e| e.element_type == element_type)
    }

    /// Finds the first element with the given type code, mutably.
    pub fn find_element_mut(&mut self, element_type: u32) -> Option<&mut Element> {
        self.elements
            .iter_mut()
            .find(|e| e.element_type == element_type)
    }

    /// Inserts or replaces the element with this type code.
    ///
    /// An existing element is replaced in place, preserving its position.
    ///
    /// # Errors
    ///
    /// Returns a capacity error if a new element would exceed the ceiling.
    pub fn set_element(&mut self, element: Element) -> Result<()> {
        match self.find_element_mut(element.element_type) {
            Some(existing) => {
                *existing = element;
                Ok(())
            }
            None => self.add_element(element),
        }
    }

    /// Removes the element with the given type code, compacting the rest.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no element has that type.
    pub fn remove_element(&mut self, element_type: u32) -> Result<()> {
        let index = self
            .elements
            .iter()
            .position(|e| e.element_type == element_type)
            .ok_or_else(|| {
                BcdError::not_found("element", &format!("{:#010x}", element_type))
            })?;
        self.elements.remove(index);
        Ok(())
    }
}

/// An ordered collection of BCD objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BcdStore {
    objects: Vec<Object>,
}

impl BcdStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every object.
    pub fn reset(&mut self) {
        self.objects.clear();
    }

    /// Returns the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns the objects in insertion order.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Appends an object without checking id uniqueness.
    ///
    /// Loaders and commands that must keep ids unique go through
    /// [`BcdStore::set_object`] instead.
    ///
    /// # Errors
    ///
    /// Returns a capacity error once [`MAX_OBJECTS`] is reached; the store
    /// is unchanged on failure.
    pub fn add_object(&mut self, object: Object) -> Result<()> {
        if self.objects.len() >= MAX_OBJECTS {
            return Err(BcdError::capacity("objects per store", MAX_OBJECTS));
        }
        self.objects.push(object);
        Ok(())
    }

    /// Inserts or replaces the object with this id.
    ///
    /// An existing object is replaced in place, preserving its position.
    ///
    /// # Errors
    ///
    /// Returns a capacity error if a new object would exceed the ceiling.
    pub fn set_object(&mut self, object: Object) -> Result<()> {
        match self.objects.iter_mut().find(|o| o.id == object.id) {
            Some(existing) => {
                *existing = object;
                Ok(())
            }
            None => self.add_object(object),
        }
    }

    /// Removes the object with the given id, compacting the rest.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no object has that id.
    pub fn delete_object(&mut self, id: &Guid) -> Result<()> {
        let index = self
            .objects
            .iter()
            .position(|o| &o.id == id)
            .ok_or_else(|| BcdError::not_found("object", &id.to_string()))?;
        self.objects.remove(index);
        Ok(())
    }

    /// Finds an object by id.
    pub fn find_object(&self, id: &Guid) -> Option<&Object> {
        self.objects.iter().find(|o| &o.id == id)
    }

    /// Finds an object by id, mutably.
    pub fn find_object_mut(&mut self, id: &Guid) -> Option<&mut Object> {
        self.objects.iter_mut().find(|o| &o.id == id)
    }

    /// Returns the object at the given index.
    pub fn object_at(&self, index: usize) -> Option<&Object> {
        self.objects.get(index)
    }
}
