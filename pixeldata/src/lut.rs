//! The tonal transformation pipeline:
//! modality rescale, VOI window level, presentation LUT.
//!
//! The three stages are independent functions,
//! so callers can compose the full
//! modality, then VOI, then presentation chain,
//! or pick the stages their use case needs.
//! [`apply_display_pipeline`] bundles the common case of
//! rescaling and windowing straight from the data set attributes.

use byteorder::{ByteOrder, LittleEndian};
use num_traits::NumCast;
use snafu::ensure;
use tracing::warn;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use dcmpix_core::error::{InvalidPixelDataSnafu, Result};
use dcmpix_core::{Dataset, PixelDescriptor, PixelRepresentation};

use crate::attribute;
use crate::buffer::{PixelBuffer, TypedView};
use crate::convert::invert_sample_bytes;

/// Description of a modality rescale function,
/// defined by a _rescale slope_ and _rescale intercept_.
#[derive(Debug, Clone, PartialEq)]
pub struct Rescale {
    /// the rescale slope, non-zero
    pub slope: f64,
    /// the rescale intercept
    pub intercept: f64,
    /// the output unit tag, such as `HU`
    pub rescale_type: Option<String>,
}

impl Rescale {
    /// Create a new rescale function without a unit tag.
    #[inline]
    pub fn new(slope: f64, intercept: f64) -> Self {
        Rescale {
            slope,
            intercept,
            rescale_type: None,
        }
    }

    /// Attach the output unit tag (the _Rescale Type_ attribute).
    pub fn with_type(mut self, rescale_type: &str) -> Self {
        self.rescale_type = Some(rescale_type.to_string());
        self
    }

    /// Apply the rescale function to a value.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        self.slope * value + self.intercept
    }

    /// Whether this rescale maps every value onto itself.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.slope == 1.0 && self.intercept == 0.0
    }
}

/// A known VOI LUT function.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum VoiLutFunction {
    /// LINEAR
    Linear,
    /// SIGMOID
    Sigmoid,
}

impl Default for VoiLutFunction {
    fn default() -> Self {
        VoiLutFunction::Linear
    }
}

/// The parameters of a single window level
/// for a VOI transformation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowLevel {
    /// The _Window Center_.
    pub center: f64,
    /// The _Window Width_, greater than 0.
    pub width: f64,
}

/// Two ways of describing the final presentation mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresentationLut {
    /// pass the samples through unchanged
    Identity,
    /// value-invert the samples against the stored-bit maximum
    Inverse,
    /// map the samples through an explicit table
    Table {
        /// the sample value mapped onto the first entry
        first_mapped: u16,
        /// the bit depth of the table entries
        bits_per_entry: u16,
        /// the table entries
        data: Vec<u16>,
    },
}

impl PresentationLut {
    /// Read the presentation LUT shape from the data set, if present.
    ///
    /// Table mode is carried in the _Presentation LUT Sequence_,
    /// which the flat value kinds cannot represent;
    /// table LUTs are constructed with
    /// [`PresentationLut::Table`] directly.
    pub fn from_dataset<D: Dataset>(ds: &D) -> Option<PresentationLut> {
        match attribute::presentation_lut_shape(ds)?.as_str() {
            "IDENTITY" => Some(PresentationLut::Identity),
            "INVERSE" => Some(PresentationLut::Inverse),
            other => {
                warn!("unrecognized presentation LUT shape `{}`", other);
                None
            }
        }
    }
}

fn ensure_grayscale(descriptor: &PixelDescriptor, what: &str) -> Result<()> {
    ensure!(
        descriptor.samples_per_pixel == 1,
        InvalidPixelDataSnafu {
            field: what,
            expected: "grayscale data, 1 sample per pixel",
            actual: format!("{} samples per pixel", descriptor.samples_per_pixel),
        }
    );
    Ok(())
}

fn samples_as_f64(view: TypedView) -> Vec<f64> {
    match view {
        TypedView::U8(v) => v.into_iter().map(<f64 as From<_>>::from).collect(),
        TypedView::I8(v) => v.into_iter().map(<f64 as From<_>>::from).collect(),
        TypedView::U16(v) => v.into_iter().map(<f64 as From<_>>::from).collect(),
        TypedView::I16(v) => v.into_iter().map(<f64 as From<_>>::from).collect(),
    }
}

fn map_samples<T: Send, U: Send>(samples: Vec<T>, f: impl Fn(T) -> U + Send + Sync) -> Vec<U> {
    #[cfg(feature = "rayon")]
    {
        samples.into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        samples.into_iter().map(f).collect()
    }
}

fn quantize<T: NumCast>(value: f64) -> T {
    T::from(value).unwrap_or_else(|| T::from(0).unwrap())
}

fn le_bytes_u16(samples: &[u16]) -> Vec<u8> {
    let mut data = vec![0u8; samples.len() * 2];
    LittleEndian::write_u16_into(samples, &mut data);
    data
}

fn le_bytes_i16(samples: &[i16]) -> Vec<u8> {
    let mut data = vec![0u8; samples.len() * 2];
    LittleEndian::write_i16_into(samples, &mut data);
    data
}

/// Apply the modality rescale to a grayscale buffer,
/// producing physical-unit sample values
/// (`applied = slope * stored + intercept`).
///
/// The sample width is preserved;
/// the representation turns signed when the intercept is negative.
/// An identity rescale returns the input unchanged,
/// color input is rejected.
pub fn apply_modality_lut(buffer: &PixelBuffer, rescale: &Rescale) -> Result<PixelBuffer> {
    let descriptor = buffer.descriptor();
    ensure_grayscale(descriptor, "modality LUT")?;
    if rescale.is_identity() {
        return Ok(buffer.clone());
    }

    let signed_out = descriptor.is_signed() || rescale.intercept < 0.0;
    let rescale = rescale.clone();
    let samples = samples_as_f64(buffer.typed_view()?);
    let data = match (descriptor.bits_allocated, signed_out) {
        (8, false) => map_samples(samples, |v| {
            quantize::<u8>(rescale.apply(v).round().clamp(0., 255.))
        }),
        (8, true) => map_samples(samples, |v| {
            quantize::<i8>(rescale.apply(v).round().clamp(-128., 127.)) as u8
        }),
        (16, false) => {
            let out = map_samples(samples, |v| {
                quantize::<u16>(rescale.apply(v).round().clamp(0., 65535.))
            });
            le_bytes_u16(&out)
        }
        (16, true) => {
            let out = map_samples(samples, |v| {
                quantize::<i16>(rescale.apply(v).round().clamp(-32768., 32767.))
            });
            le_bytes_i16(&out)
        }
        (bits, _) => {
            return InvalidPixelDataSnafu {
                field: "bits_allocated",
                expected: "8 or 16",
                actual: bits.to_string(),
            }
            .fail()
        }
    };

    let mut descriptor = descriptor.clone();
    descriptor.pixel_representation = if signed_out {
        PixelRepresentation::Signed
    } else {
        PixelRepresentation::Unsigned
    };
    Ok(PixelBuffer::from_parts(descriptor, data))
}

/// Apply a linear VOI window level to a grayscale buffer,
/// producing unsigned output at the requested bit depth (8 or 16).
///
/// Values at or below `center - width/2` map to 0,
/// values at or above `center + width/2` map to the output maximum,
/// and the window interior maps linearly in between.
pub fn apply_voi(
    buffer: &PixelBuffer,
    window: WindowLevel,
    output_bits: u16,
) -> Result<PixelBuffer> {
    apply_voi_with_function(buffer, VoiLutFunction::Linear, window, output_bits)
}

/// Apply a VOI window level with an explicit LUT function.
pub fn apply_voi_with_function(
    buffer: &PixelBuffer,
    function: VoiLutFunction,
    window: WindowLevel,
    output_bits: u16,
) -> Result<PixelBuffer> {
    let descriptor = buffer.descriptor();
    ensure_grayscale(descriptor, "VOI LUT")?;
    ensure!(
        window.width > 0.,
        InvalidPixelDataSnafu {
            field: "window_width",
            expected: "a positive width",
            actual: window.width.to_string(),
        }
    );
    ensure!(
        output_bits == 8 || output_bits == 16,
        InvalidPixelDataSnafu {
            field: "output_bits",
            expected: "8 or 16",
            actual: output_bits.to_string(),
        }
    );

    let out_max = <f64 as From<u32>>::from((1u32 << output_bits) - 1);
    let low = window.center - window.width / 2.;
    let high = window.center + window.width / 2.;
    let apply = move |v: f64| -> f64 {
        match function {
            VoiLutFunction::Linear => {
                if v <= low {
                    0.
                } else if v >= high {
                    out_max
                } else {
                    ((v - low) / window.width * out_max).round()
                }
            }
            VoiLutFunction::Sigmoid => {
                (out_max / (1. + f64::exp(-4. * (v - window.center) / window.width))).round()
            }
        }
    };

    let samples = samples_as_f64(buffer.typed_view()?);
    let data = if output_bits == 8 {
        map_samples(samples, move |v| quantize::<u8>(apply(v)))
    } else {
        let out: Vec<u16> = map_samples(samples, move |v| quantize::<u16>(apply(v)));
        le_bytes_u16(&out)
    };

    let mut descriptor = descriptor.clone();
    descriptor.bits_allocated = output_bits;
    descriptor.bits_stored = output_bits;
    descriptor.high_bit = output_bits - 1;
    descriptor.pixel_representation = PixelRepresentation::Unsigned;
    Ok(PixelBuffer::from_parts(descriptor, data))
}

/// Min-max normalize a grayscale buffer
/// onto the full unsigned range of the requested bit depth.
pub fn normalize_to_range(buffer: &PixelBuffer, output_bits: u16) -> Result<PixelBuffer> {
    let descriptor = buffer.descriptor();
    ensure_grayscale(descriptor, "normalization")?;
    ensure!(
        output_bits == 8 || output_bits == 16,
        InvalidPixelDataSnafu {
            field: "output_bits",
            expected: "8 or 16",
            actual: output_bits.to_string(),
        }
    );

    let samples = samples_as_f64(buffer.typed_view()?);
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max > min { max - min } else { 1. };
    let out_max = <f64 as From<u32>>::from((1u32 << output_bits) - 1);
    let apply = move |v: f64| ((v - min) / range * out_max).round();

    let data = if output_bits == 8 {
        map_samples(samples, move |v| quantize::<u8>(apply(v)))
    } else {
        let out: Vec<u16> = map_samples(samples, move |v| quantize::<u16>(apply(v)));
        le_bytes_u16(&out)
    };

    let mut descriptor = descriptor.clone();
    descriptor.bits_allocated = output_bits;
    descriptor.bits_stored = output_bits;
    descriptor.high_bit = output_bits - 1;
    descriptor.pixel_representation = PixelRepresentation::Unsigned;
    Ok(PixelBuffer::from_parts(descriptor, data))
}

/// Apply the data set's rescale and window attributes to a raw buffer:
/// the modality LUT when present and not the identity,
/// then the VOI window when present,
/// at the requested output bit depth.
/// With neither attribute in the data set
/// the input is returned unchanged.
pub fn apply_display_pipeline<D: Dataset>(
    ds: &D,
    buffer: &PixelBuffer,
    output_bits: u16,
) -> Result<PixelBuffer> {
    let rescale = Rescale {
        slope: attribute::rescale_slope(ds),
        intercept: attribute::rescale_intercept(ds),
        rescale_type: attribute::rescale_type(ds),
    };
    let window = match (attribute::window_center(ds), attribute::window_width(ds)) {
        (Some(center), Some(width)) => Some(WindowLevel { center, width }),
        _ => None,
    };

    if rescale.is_identity() && window.is_none() {
        return Ok(buffer.clone());
    }

    let rescaled = if rescale.is_identity() {
        buffer.clone()
    } else {
        apply_modality_lut(buffer, &rescale)?
    };
    match window {
        Some(window) => apply_voi(&rescaled, window, output_bits),
        None => Ok(rescaled),
    }
}

/// Apply a presentation LUT to a grayscale buffer.
///
/// Table mode clamps out-of-range inputs to the table ends,
/// caps every entry at the entry bit depth's maximum,
/// and the output adopts the table's bit depth.
pub fn apply_presentation_lut(buffer: &PixelBuffer, lut: &PresentationLut) -> Result<PixelBuffer> {
    match lut {
        PresentationLut::Identity => Ok(buffer.clone()),
        PresentationLut::Inverse => {
            let data = invert_sample_bytes(buffer)?;
            Ok(PixelBuffer::from_parts(buffer.descriptor().clone(), data))
        }
        PresentationLut::Table {
            first_mapped,
            bits_per_entry,
            data,
        } => {
            let descriptor = buffer.descriptor();
            ensure_grayscale(descriptor, "presentation LUT")?;
            ensure!(
                (1..=16).contains(bits_per_entry),
                InvalidPixelDataSnafu {
                    field: "bits_per_entry",
                    expected: "between 1 and 16",
                    actual: bits_per_entry.to_string(),
                }
            );
            ensure!(
                !data.is_empty(),
                InvalidPixelDataSnafu {
                    field: "presentation LUT data",
                    expected: "at least one entry",
                    actual: "an empty table",
                }
            );

            let cap = ((1u32 << bits_per_entry) - 1) as u16;
            let first = <i64 as From<_>>::from(*first_mapped);
            let last = data.len() as i64 - 1;
            let table = data.as_slice();
            let lookup = |v: f64| -> u16 {
                let index = (v as i64 - first).clamp(0, last) as usize;
                table[index].min(cap)
            };

            let samples = samples_as_f64(buffer.typed_view()?);
            let output_bits: u16 = if *bits_per_entry <= 8 { 8 } else { 16 };
            let out: Vec<u16> = samples.into_iter().map(lookup).collect();
            let data = if output_bits == 8 {
                out.into_iter().map(|v| v as u8).collect()
            } else {
                le_bytes_u16(&out)
            };

            let mut descriptor = descriptor.clone();
            descriptor.bits_allocated = output_bits;
            descriptor.bits_stored = *bits_per_entry;
            descriptor.high_bit = *bits_per_entry - 1;
            descriptor.pixel_representation = PixelRepresentation::Unsigned;
            Ok(PixelBuffer::from_parts(descriptor, data))
        }
    }
}
