//! Root module for the pixel data codec adapters.
//!
//! Additional support for certain transfer syntaxes
//! can be added via Cargo features.
//!
//! - [`jpeg`] provides JPEG decoding for the baseline and lossless processes.
//!   Requires the `jpeg` feature, enabled by default.
//! - [`jpeg2k`] contains JPEG 2000 and High-Throughput JPEG 2000 support,
//!   which is currently available through OpenJPEG.
//!   Use feature `openjpeg-sys` to statically link to
//!   the OpenJPEG reference implementation,
//!   or feature `openjp2` for the Rust port of OpenJPEG.
//! - [`rle_lossless`] provides native RLE lossless decoding.
//!   Requires the `rle` feature, enabled by default.
//!
//! Transfer syntaxes compiled out of the build
//! are registered as [`stub`] codecs which always fail,
//! so that a lookup succeeds and the failure carries the reason.

#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(any(feature = "openjp2", feature = "openjpeg-sys"))]
pub mod jpeg2k;
#[cfg(feature = "rle")]
pub mod rle_lossless;

pub mod stub;
pub mod uncompressed;

/// **Note:** This module is a stub.
/// Enable the `jpeg` feature to use this module.
#[cfg(not(feature = "jpeg"))]
pub mod jpeg {}

/// **Note:** This module is a stub.
/// Enable either `openjp2` or `openjpeg-sys` to use this module.
#[cfg(not(any(feature = "openjp2", feature = "openjpeg-sys")))]
pub mod jpeg2k {}

/// **Note:** This module is a stub.
/// Enable the `rle` feature to use this module.
#[cfg(not(feature = "rle"))]
pub mod rle_lossless {}
