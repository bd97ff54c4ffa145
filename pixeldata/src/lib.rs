#![allow(clippy::derive_partial_eq_without_eq)]
//! This crate contains the high-level DICOM pixel data API:
//! decoding native and encapsulated pixel data into
//! a well-described buffer,
//! constructing buffers from raw sample arrays,
//! and the standard image transformations
//! (photometric interpretation, planar configuration,
//! modality and VOI LUTs, presentation LUT, palette color).
//!
//! The decoding path consumes any type implementing the
//! [`Dataset`](dcmpix_core::Dataset) contract
//! of an upstream DICOM parser:
//!
//! ```no_run
//! use dcmpix_core::MemDataset;
//! use dcmpix_pixeldata::PixelDecoder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ds: MemDataset = unimplemented!("parsed by the upstream container parser");
//! let pixel_data = ds.decode_pixel_data()?;
//! assert_eq!(pixel_data.frames().len() as u32,
//!     pixel_data.descriptor().number_of_frames);
//! # Ok(())
//! # }
//! ```
//!
//! Once decoded, a [`PixelBuffer`] offers the raw bytes,
//! a [typed view](PixelBuffer::typed_view) over its samples,
//! per-frame slices,
//! and (with the `image` feature) a raster projection:
//!
//! ```no_run
//! # #[cfg(feature = "image")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let pixel_data: dcmpix_pixeldata::PixelBuffer = unimplemented!();
//! let image = pixel_data.raster(0)?;
//! image.save("out.png")?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "image"))]
//! # fn main() {}
//! ```
//!
//! The tonal stages are free functions which
//! each produce a new buffer,
//! so the full display chain is an ordinary composition
//! of [`apply_modality_lut`], [`apply_voi`]
//! and [`apply_presentation_lut`];
//! [`apply_display_pipeline`] covers the common
//! rescale-and-window case directly from the data set attributes.

pub mod attribute;
mod buffer;
mod builder;
mod convert;
mod extract;
pub mod icc;
mod lut;
mod palette;
pub mod srgb;

pub use buffer::{PixelBuffer, TypedView};
pub use builder::PixelBufferBuilder;
pub use convert::{to_photometric_interpretation, to_planar_configuration};
pub use extract::{extract_pixel_data, read_descriptor, PixelDecoder};
pub use lut::{
    apply_display_pipeline, apply_modality_lut, apply_presentation_lut, apply_voi,
    apply_voi_with_function, normalize_to_range, PresentationLut, Rescale, VoiLutFunction,
    WindowLevel,
};
pub use palette::{expand_segmented_lut, LutChannel, PaletteColorLut};

// re-exports from the sibling crates
pub use dcmpix_codecs::{Codec, CodecRegistry};
pub use dcmpix_core::{
    Error, PhotometricInterpretation, PixelDescriptor, PixelRepresentation, PlanarConfiguration,
    Result,
};

#[cfg(feature = "image")]
pub use image;
