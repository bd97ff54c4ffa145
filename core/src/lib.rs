#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(missing_debug_implementations, unused_qualifications, unused_import_braces)]
//! Core value types for the `dcmpix` pixel data crates.
//!
//! This crate defines the pieces shared by the codec layer and the
//! high-level pixel data API:
//!
//! - [`Tag`] and the known attribute tags in [`tags`];
//! - [`Value`] and [`Element`], the element values handed over
//!   by an upstream DICOM data set parser;
//! - the read-only [`Dataset`] contract and the map-backed
//!   [`MemDataset`] implementation;
//! - the [`PixelDescriptor`] describing any raster
//!   and its accompanying code enumerations;
//! - the common [`Error`] type for pixel data operations.
//!
//! Parsing DICOM files is explicitly not this crate's concern.
//! An upstream parser produces a data set;
//! this crate only fixes the shape in which
//! the pixel data subsystem consumes it.

mod dataset;
mod descriptor;
pub mod error;
pub mod tags;
mod value;

pub use dataset::{Dataset, MemDataset};
pub use descriptor::{
    PhotometricInterpretation, PixelDescriptor, PixelRepresentation, PlanarConfiguration,
};
pub use error::{Error, Result};
pub use value::{Element, Value};

use std::fmt;
use std::str::FromStr;

/// An attribute tag, as a pair of 16-bit group and element numbers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u16, pub u16);

impl Tag {
    /// Retrieve the tag's group number.
    #[inline]
    pub fn group(self) -> u16 {
        self.0
    }

    /// Retrieve the tag's element number.
    #[inline]
    pub fn element(self) -> u16 {
        self.1
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from((group, element): (u16, u16)) -> Self {
        Tag(group, element)
    }
}

/// Unrecognized tag form
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseTagError;

impl FromStr for Tag {
    type Err = ParseTagError;

    /// Parse a tag from the `(GGGG,EEEE)` or `GGGG,EEEE` text forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('(').trim_end_matches(')');
        let (group, element) = s.split_once(',').ok_or(ParseTagError)?;
        let group = u16::from_str_radix(group.trim(), 16).map_err(|_| ParseTagError)?;
        let element = u16::from_str_radix(element.trim(), 16).map_err(|_| ParseTagError)?;
        Ok(Tag(group, element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_display_and_parse() {
        let tag = Tag(0x7FE0, 0x0010);
        assert_eq!(tag.to_string(), "(7FE0,0010)");
        assert_eq!("(7FE0,0010)".parse(), Ok(tag));
        assert_eq!("0028,0004".parse(), Ok(Tag(0x0028, 0x0004)));
        assert!("bogus".parse::<Tag>().is_err());
    }
}
