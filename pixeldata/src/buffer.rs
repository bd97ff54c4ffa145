//! The in-memory pixel buffer and its typed projections.

use byteorder::{ByteOrder, LittleEndian};
use snafu::ensure;
use tracing::warn;

use dcmpix_core::error::{InvalidPixelDataSnafu, Result};
use dcmpix_core::{PixelDescriptor, PixelRepresentation};

#[cfg(feature = "image")]
use dcmpix_core::PlanarConfiguration;
#[cfg(feature = "image")]
use image::{DynamicImage, ImageBuffer, Luma, Rgba};

/// A blob of decoded pixel data and the descriptor it conforms to.
///
/// The sample bytes are stored in native form:
/// little-endian words for 16-bit samples,
/// frames concatenated in index order.
/// A pixel buffer is immutable once constructed;
/// the transformations in this crate produce new buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    descriptor: PixelDescriptor,
    data: Vec<u8>,
}

/// A typed projection of a pixel buffer's samples,
/// discriminated by bits allocated and pixel representation.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedView {
    /// 8 bits per sample, unsigned
    U8(Vec<u8>),
    /// 8 bits per sample, signed
    I8(Vec<i8>),
    /// 16 bits per sample, unsigned
    U16(Vec<u16>),
    /// 16 bits per sample, signed
    I16(Vec<i16>),
}

impl TypedView {
    /// The number of samples in the view.
    pub fn len(&self) -> usize {
        match self {
            TypedView::U8(v) => v.len(),
            TypedView::I8(v) => v.len(),
            TypedView::U16(v) => v.len(),
            TypedView::I16(v) => v.len(),
        }
    }

    /// Whether the view holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PixelBuffer {
    /// Assemble a pixel buffer from a descriptor and its byte payload.
    ///
    /// The payload is taken as-is;
    /// construction paths which promise a size-consistent buffer
    /// (the builder and the extractor) validate before calling this.
    pub fn from_parts(descriptor: PixelDescriptor, data: Vec<u8>) -> Self {
        PixelBuffer { descriptor, data }
    }

    /// The descriptor of this pixel data.
    #[inline]
    pub fn descriptor(&self) -> &PixelDescriptor {
        &self.descriptor
    }

    /// All raw sample bytes, over all frames.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take the raw sample bytes out of the buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Project the sample bytes into their typed form,
    /// as determined by bits allocated and pixel representation.
    ///
    /// 16-bit samples are read as little-endian words.
    pub fn typed_view(&self) -> Result<TypedView> {
        match (self.descriptor.bits_allocated, self.descriptor.pixel_representation) {
            (8, PixelRepresentation::Unsigned) => Ok(TypedView::U8(self.data.clone())),
            (8, PixelRepresentation::Signed) => {
                Ok(TypedView::I8(self.data.iter().map(|&b| b as i8).collect()))
            }
            (16, PixelRepresentation::Unsigned) => {
                let mut samples = vec![0u16; self.data.len() / 2];
                LittleEndian::read_u16_into(&self.data[..samples.len() * 2], &mut samples);
                Ok(TypedView::U16(samples))
            }
            (16, PixelRepresentation::Signed) => {
                let mut samples = vec![0i16; self.data.len() / 2];
                LittleEndian::read_i16_into(&self.data[..samples.len() * 2], &mut samples);
                Ok(TypedView::I16(samples))
            }
            (other, _) => InvalidPixelDataSnafu {
                field: "bits_allocated",
                expected: "8 or 16",
                actual: other.to_string(),
            }
            .fail(),
        }
    }

    /// Slice the buffer into its frames.
    ///
    /// Frames are equally sized contiguous chunks;
    /// when the payload falls short of a whole multiple,
    /// the last frame comes out truncated (with a warning).
    pub fn frames(&self) -> Vec<&[u8]> {
        let frame_size = self.descriptor.frame_size_in_bytes();
        if frame_size == 0 {
            return Vec::new();
        }
        let mut frames = Vec::with_capacity(self.descriptor.number_of_frames as usize);
        for index in 0..self.descriptor.number_of_frames as usize {
            let start = index * frame_size;
            if start >= self.data.len() {
                warn!("frame #{} has no data, buffer ends early", index);
                break;
            }
            let end = (start + frame_size).min(self.data.len());
            if end - start < frame_size {
                warn!(
                    "frame #{} is truncated ({} of {} bytes)",
                    index,
                    end - start,
                    frame_size
                );
            }
            frames.push(&self.data[start..end]);
        }
        frames
    }

    /// The raw sample bytes of one full frame.
    pub fn frame_data(&self, frame: u32) -> Result<&[u8]> {
        let frame_size = self.descriptor.frame_size_in_bytes();
        let start = frame_size * frame as usize;
        let end = start + frame_size;
        ensure!(
            end <= self.data.len(),
            InvalidPixelDataSnafu {
                field: format!("frame #{}", frame),
                expected: format!("{} bytes of frame data", frame_size),
                actual: format!("{} bytes left", self.data.len().saturating_sub(start)),
            }
        );
        Ok(&self.data[start..end])
    }

    /// Project one frame onto a standard raster image:
    /// 8 or 16-bit grayscale for single-sample data,
    /// RGBA with opaque alpha for three-sample data.
    ///
    /// Signed grayscale samples are shifted into the unsigned range,
    /// preserving their order.
    /// Planar color data is gathered into interleaved pixels.
    #[cfg(feature = "image")]
    pub fn raster(&self, frame: u32) -> Result<DynamicImage> {
        let columns = u32::from(self.descriptor.columns);
        let rows = u32::from(self.descriptor.rows);
        let data = self.frame_data(frame)?;

        match (self.descriptor.samples_per_pixel, self.descriptor.bits_allocated) {
            (1, 8) => {
                let data = match self.descriptor.pixel_representation {
                    PixelRepresentation::Unsigned => data.to_vec(),
                    PixelRepresentation::Signed => data
                        .iter()
                        .map(|&b| (i16::from(b as i8) + 0x80) as u8)
                        .collect(),
                };
                let image_buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(columns, rows, data).ok_or_else(invalid_image_buffer)?;
                Ok(DynamicImage::ImageLuma8(image_buffer))
            }
            (1, 16) => {
                let mut samples = vec![0u16; data.len() / 2];
                LittleEndian::read_u16_into(data, &mut samples);
                if self.descriptor.is_signed() {
                    // shift two's complement up, keeping the sample order
                    for sample in &mut samples {
                        *sample = (i32::from(*sample as i16) + 0x8000) as u16;
                    }
                }
                let image_buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
                    ImageBuffer::from_raw(columns, rows, samples)
                        .ok_or_else(invalid_image_buffer)?;
                Ok(DynamicImage::ImageLuma16(image_buffer))
            }
            (3, 8) => {
                let pixels = rows as usize * columns as usize;
                let mut rgba = Vec::with_capacity(pixels * 4);
                match self.descriptor.planar_configuration {
                    PlanarConfiguration::Interleaved => {
                        for pixel in data.chunks_exact(3) {
                            rgba.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 0xFF]);
                        }
                    }
                    PlanarConfiguration::Planar => {
                        // planes span all frames of the buffer
                        let plane = self.descriptor.number_of_frames as usize * pixels;
                        let base = frame as usize * pixels;
                        for i in 0..pixels {
                            rgba.extend_from_slice(&[
                                self.data[base + i],
                                self.data[plane + base + i],
                                self.data[2 * plane + base + i],
                                0xFF,
                            ]);
                        }
                    }
                }
                let image_buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(columns, rows, rgba).ok_or_else(invalid_image_buffer)?;
                Ok(DynamicImage::ImageRgba8(image_buffer))
            }
            (spp, bits) => InvalidPixelDataSnafu {
                field: "samples_per_pixel/bits_allocated",
                expected: "a grayscale raster or 8-bit color",
                actual: format!("{} samples at {} bits", spp, bits),
            }
            .fail(),
        }
    }
}

#[cfg(feature = "image")]
fn invalid_image_buffer() -> dcmpix_core::Error {
    InvalidPixelDataSnafu {
        field: "raster",
        expected: "a buffer filling the image dimensions",
        actual: "too few bytes",
    }
    .build()
}
