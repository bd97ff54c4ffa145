//! The read-only data set contract consumed by the pixel data subsystem.

use std::collections::BTreeMap;

use crate::{Element, Tag, Value};

/// A read-only view over a parsed DICOM data set.
///
/// The upstream container parser
/// (preamble, file meta, VR-aware element stream)
/// is out of this workspace's scope;
/// anything which can answer `get(tag)` qualifies.
/// File meta attributes such as _Transfer Syntax UID_
/// are expected to be reachable through the same lookup.
pub trait Dataset {
    /// Get the element with the given tag, if present.
    fn get(&self, tag: Tag) -> Option<&Element>;
}

impl<D: Dataset + ?Sized> Dataset for &D {
    fn get(&self, tag: Tag) -> Option<&Element> {
        (**self).get(tag)
    }
}

/// A minimal in-memory [`Dataset`],
/// for assembling data sets by hand and in tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemDataset {
    elements: BTreeMap<Tag, Element>,
}

impl MemDataset {
    /// Create an empty data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element, replacing any element with the same tag.
    pub fn put(&mut self, element: Element) {
        self.elements.insert(element.tag(), element);
    }

    /// Insert an element built from a tag and a value,
    /// returning `self` for chaining.
    pub fn with(mut self, tag: Tag, value: impl Into<Value>) -> Self {
        self.put(Element::new(tag, value));
        self
    }

    /// Insert a single-integer element, returning `self` for chaining.
    pub fn with_int(self, tag: Tag, value: i64) -> Self {
        self.with(tag, Value::Ints(vec![value]))
    }

    /// Insert a string element, returning `self` for chaining.
    pub fn with_str(self, tag: Tag, value: &str) -> Self {
        self.with(tag, Value::Strs(vec![value.to_string()]))
    }

    /// Insert a byte bag element, returning `self` for chaining.
    pub fn with_bytes(self, tag: Tag, value: Vec<u8>) -> Self {
        self.with(tag, Value::Bytes(value))
    }

    /// Remove the element with the given tag, if present.
    pub fn remove(&mut self, tag: Tag) -> Option<Element> {
        self.elements.remove(&tag)
    }

    /// Iterate over the elements in tag order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }
}

impl Dataset for MemDataset {
    fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.get(&tag)
    }
}
