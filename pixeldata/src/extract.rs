//! Extraction of decoded pixel data from a data set.

use snafu::{ensure, OptionExt};
use tracing::debug;

use dcmpix_codecs::{entries, CodecRegistry, FragmentStream};
use dcmpix_core::error::{DecompressionFailedSnafu, InvalidPixelDataSnafu, Result};
use dcmpix_core::{Dataset, Error, PixelDescriptor, PlanarConfiguration};

use crate::attribute;
use crate::buffer::PixelBuffer;

/// Read the raster description from the data set attributes.
///
/// The required attributes are
/// _Rows_, _Columns_, _Bits Allocated_, _Bits Stored_, _High Bit_,
/// _Pixel Representation_, _Samples per Pixel_,
/// _Photometric Interpretation_, and _Transfer Syntax UID_;
/// _Planar Configuration_ defaults to interleaved
/// and _Number of Frames_ to 1.
pub fn read_descriptor<D: Dataset>(ds: &D) -> Result<PixelDescriptor> {
    let samples_per_pixel = attribute::samples_per_pixel(ds)?;
    let bits_allocated = attribute::bits_allocated(ds)?;
    let bits_stored = attribute::bits_stored(ds)?;
    ensure!(
        bits_stored <= bits_allocated,
        InvalidPixelDataSnafu {
            field: "BitsStored",
            expected: format!("at most BitsAllocated ({})", bits_allocated),
            actual: bits_stored.to_string(),
        }
    );

    let planar_configuration = if samples_per_pixel == 1 {
        // irrelevant for single-sample data
        PlanarConfiguration::Interleaved
    } else {
        attribute::planar_configuration(ds)
    };

    Ok(PixelDescriptor {
        rows: attribute::rows(ds)?,
        columns: attribute::columns(ds)?,
        bits_allocated,
        bits_stored,
        high_bit: attribute::high_bit(ds)?,
        pixel_representation: attribute::pixel_representation(ds)?,
        samples_per_pixel,
        photometric_interpretation: attribute::photometric_interpretation(ds)?,
        planar_configuration,
        number_of_frames: attribute::number_of_frames(ds)?,
        transfer_syntax_uid: attribute::transfer_syntax_uid(ds)?,
    })
}

/// Decode the pixel data element of a data set into a [`PixelBuffer`].
///
/// The transfer syntax decides the path:
/// the four uncompressed syntaxes take the whole raster through
/// the pass-through codec with one size validation,
/// anything else is parsed as an encapsulated fragment sequence
/// and decoded frame by frame in index order.
pub fn extract_pixel_data<D: Dataset>(ds: &D) -> Result<PixelBuffer> {
    let descriptor = read_descriptor(ds)?;
    let element = attribute::pixel_data(ds)?;
    let src = element.bytes().with_context(|| InvalidPixelDataSnafu {
        field: "PixelData",
        expected: "a byte bag",
        actual: "another value kind",
    })?;

    let codec = CodecRegistry::lookup(&descriptor.transfer_syntax_uid)?;

    if entries::is_native(&descriptor.transfer_syntax_uid) {
        let data = codec.decode(src, &descriptor)?;
        let expected = descriptor.expected_len();
        ensure!(
            data.len() == expected,
            InvalidPixelDataSnafu {
                field: "PixelData",
                expected: format!("{} bytes", expected),
                actual: data.len().to_string(),
            }
        );
        return Ok(PixelBuffer::from_parts(descriptor, data.into_owned()));
    }

    let stream = FragmentStream::parse(src)?;
    let frames = descriptor.number_of_frames;
    if frames > 1 && !stream.basic_offset_table().is_empty() {
        ensure!(
            stream.basic_offset_table().len() == frames as usize,
            InvalidPixelDataSnafu {
                field: "basic offset table",
                expected: format!("{} entries", frames),
                actual: stream.basic_offset_table().len().to_string(),
            }
        );
    }

    let frame_descriptor = descriptor.for_single_frame();
    let frame_size = frame_descriptor.expected_len();
    let mut data = Vec::with_capacity(frame_size * frames as usize);
    for frame in 0..frames {
        debug!("decoding frame {}/{}", frame + 1, frames);
        let frame_src = stream.frame_data(frame)?;
        let decoded = codec
            .decode(&frame_src, &frame_descriptor)
            .map_err(|e| tag_frame(e, frame))?;
        ensure!(
            decoded.len() == frame_size,
            InvalidPixelDataSnafu {
                field: format!("frame #{}", frame),
                expected: format!("{} bytes", frame_size),
                actual: decoded.len().to_string(),
            }
        );
        data.extend_from_slice(&decoded);
    }

    Ok(PixelBuffer::from_parts(descriptor, data))
}

/// Carry the frame index into a per-frame codec failure.
fn tag_frame(error: Error, frame: u32) -> Error {
    match error {
        Error::DecompressionFailed { uid, message, .. } => DecompressionFailedSnafu {
            uid,
            message: format!("frame #{}: {}", frame, message),
        }
        .build(),
        other => other,
    }
}

/// Trait for data sets which can be decoded into
/// blobs of easily consumable pixel data.
pub trait PixelDecoder {
    /// Decode the full pixel data in this data set,
    /// yielding the image properties
    /// and the pixel data in native form.
    fn decode_pixel_data(&self) -> Result<PixelBuffer>;
}

impl<D: Dataset> PixelDecoder for D {
    fn decode_pixel_data(&self) -> Result<PixelBuffer> {
        extract_pixel_data(self)
    }
}
