//! Validated construction of pixel buffers from raw sample arrays.

use byteorder::{ByteOrder, LittleEndian};
use snafu::ensure;

use dcmpix_codecs::entries;
use dcmpix_core::error::{InvalidPixelDataSnafu, Result};
use dcmpix_core::{
    PhotometricInterpretation, PixelDescriptor, PixelRepresentation, PlanarConfiguration,
};

use crate::buffer::PixelBuffer;

/// Fluent builder for a [`PixelBuffer`],
/// collecting descriptor fields and a byte payload.
///
/// `build` validates the collected description:
/// dimensions and payload must be non-empty,
/// bits stored may not exceed bits allocated,
/// and the payload length must equal the descriptor's byte size.
/// Bits stored defaults to bits allocated
/// and the high bit to bits stored minus one.
///
/// # Example
///
/// ```
/// use dcmpix_pixeldata::PixelBufferBuilder;
///
/// let buffer = PixelBufferBuilder::new()
///     .rows(2)
///     .columns(2)
///     .bits_allocated(8)
///     .photometric_interpretation("MONOCHROME2")
///     .data(vec![0, 64, 128, 255])
///     .build()?;
/// assert_eq!(buffer.descriptor().bits_stored, 8);
/// # Ok::<(), dcmpix_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PixelBufferBuilder {
    rows: u16,
    columns: u16,
    bits_allocated: u16,
    bits_stored: Option<u16>,
    high_bit: Option<u16>,
    pixel_representation: PixelRepresentation,
    samples_per_pixel: u16,
    photometric_interpretation: PhotometricInterpretation,
    planar_configuration: PlanarConfiguration,
    number_of_frames: u32,
    transfer_syntax_uid: String,
    data: Vec<u8>,
}

impl Default for PixelBufferBuilder {
    fn default() -> Self {
        PixelBufferBuilder {
            rows: 0,
            columns: 0,
            bits_allocated: 0,
            bits_stored: None,
            high_bit: None,
            pixel_representation: PixelRepresentation::Unsigned,
            samples_per_pixel: 1,
            photometric_interpretation: PhotometricInterpretation::Monochrome2,
            planar_configuration: PlanarConfiguration::Interleaved,
            number_of_frames: 1,
            transfer_syntax_uid: entries::EXPLICIT_VR_LITTLE_ENDIAN.to_string(),
            data: Vec::new(),
        }
    }
}

impl PixelBufferBuilder {
    /// Start a builder with the defaults:
    /// one unsigned `MONOCHROME2` sample per pixel, one frame,
    /// Explicit VR Little Endian provenance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of rows.
    pub fn rows(mut self, rows: u16) -> Self {
        self.rows = rows;
        self
    }

    /// Set the number of columns.
    pub fn columns(mut self, columns: u16) -> Self {
        self.columns = columns;
        self
    }

    /// Set the number of bits allocated per sample.
    pub fn bits_allocated(mut self, bits_allocated: u16) -> Self {
        self.bits_allocated = bits_allocated;
        self
    }

    /// Set the number of bits effectively stored per sample.
    pub fn bits_stored(mut self, bits_stored: u16) -> Self {
        self.bits_stored = Some(bits_stored);
        self
    }

    /// Set the high bit index.
    pub fn high_bit(mut self, high_bit: u16) -> Self {
        self.high_bit = Some(high_bit);
        self
    }

    /// Set the pixel representation.
    pub fn pixel_representation(mut self, pixel_representation: PixelRepresentation) -> Self {
        self.pixel_representation = pixel_representation;
        self
    }

    /// Set the number of samples per pixel.
    pub fn samples_per_pixel(mut self, samples_per_pixel: u16) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self
    }

    /// Set the photometric interpretation from its code string.
    pub fn photometric_interpretation(mut self, code: &str) -> Self {
        self.photometric_interpretation = PhotometricInterpretation::from(code);
        self
    }

    /// Set the planar configuration.
    pub fn planar_configuration(mut self, planar_configuration: PlanarConfiguration) -> Self {
        self.planar_configuration = planar_configuration;
        self
    }

    /// Set the number of frames.
    pub fn number_of_frames(mut self, number_of_frames: u32) -> Self {
        self.number_of_frames = number_of_frames;
        self
    }

    /// Set the provenance transfer syntax UID.
    pub fn transfer_syntax_uid(mut self, uid: &str) -> Self {
        self.transfer_syntax_uid = uid.to_string();
        self
    }

    /// Set the sample byte payload.
    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Validate the collected description and assemble the pixel buffer.
    pub fn build(self) -> Result<PixelBuffer> {
        ensure!(
            self.rows > 0 && self.columns > 0,
            InvalidPixelDataSnafu {
                field: "rows/columns",
                expected: "non-zero dimensions",
                actual: format!("{}x{}", self.columns, self.rows),
            }
        );
        ensure!(
            !self.data.is_empty(),
            InvalidPixelDataSnafu {
                field: "data",
                expected: "a non-empty payload",
                actual: "0 bytes",
            }
        );
        ensure!(
            self.bits_allocated > 0,
            InvalidPixelDataSnafu {
                field: "bits_allocated",
                expected: "a positive bit depth",
                actual: "0",
            }
        );
        let bits_stored = self.bits_stored.unwrap_or(self.bits_allocated);
        ensure!(
            bits_stored > 0,
            InvalidPixelDataSnafu {
                field: "bits_stored",
                expected: "a positive bit depth",
                actual: "0",
            }
        );
        let high_bit = self.high_bit.unwrap_or(bits_stored - 1);
        ensure!(
            bits_stored <= self.bits_allocated,
            InvalidPixelDataSnafu {
                field: "bits_stored",
                expected: format!("at most bits_allocated ({})", self.bits_allocated),
                actual: bits_stored.to_string(),
            }
        );
        ensure!(
            high_bit < bits_stored,
            InvalidPixelDataSnafu {
                field: "high_bit",
                expected: format!("below bits_stored ({})", bits_stored),
                actual: high_bit.to_string(),
            }
        );
        ensure!(
            self.samples_per_pixel > 0,
            InvalidPixelDataSnafu {
                field: "samples_per_pixel",
                expected: "a positive sample count",
                actual: "0",
            }
        );
        ensure!(
            !self.photometric_interpretation.as_str().is_empty(),
            InvalidPixelDataSnafu {
                field: "photometric_interpretation",
                expected: "a non-empty code string",
                actual: "an empty string",
            }
        );

        let descriptor = PixelDescriptor {
            rows: self.rows,
            columns: self.columns,
            bits_allocated: self.bits_allocated,
            bits_stored,
            high_bit,
            pixel_representation: self.pixel_representation,
            samples_per_pixel: self.samples_per_pixel,
            photometric_interpretation: self.photometric_interpretation,
            planar_configuration: if self.samples_per_pixel == 1 {
                PlanarConfiguration::Interleaved
            } else {
                self.planar_configuration
            },
            number_of_frames: self.number_of_frames,
            transfer_syntax_uid: self.transfer_syntax_uid,
        };

        let expected = descriptor.expected_len();
        ensure!(
            self.data.len() == expected,
            InvalidPixelDataSnafu {
                field: "data",
                expected: format!("{} bytes for the described raster", expected),
                actual: self.data.len().to_string(),
            }
        );

        Ok(PixelBuffer::from_parts(descriptor, self.data))
    }
}

impl PixelBuffer {
    /// Build an 8-bit unsigned `MONOCHROME2` buffer from grayscale samples.
    pub fn from_mono8(samples: Vec<u8>, rows: u16, columns: u16) -> Result<PixelBuffer> {
        PixelBufferBuilder::new()
            .rows(rows)
            .columns(columns)
            .bits_allocated(8)
            .data(samples)
            .build()
    }

    /// Build a 16-bit unsigned `MONOCHROME2` buffer from grayscale samples,
    /// serialized little-endian.
    pub fn from_mono16(samples: &[u16], rows: u16, columns: u16) -> Result<PixelBuffer> {
        let mut data = vec![0u8; samples.len() * 2];
        LittleEndian::write_u16_into(samples, &mut data);
        PixelBufferBuilder::new()
            .rows(rows)
            .columns(columns)
            .bits_allocated(16)
            .data(data)
            .build()
    }

    /// Build a 16-bit signed `MONOCHROME2` buffer from grayscale samples,
    /// serialized as little-endian two's complement.
    pub fn from_mono16_signed(samples: &[i16], rows: u16, columns: u16) -> Result<PixelBuffer> {
        let mut data = vec![0u8; samples.len() * 2];
        LittleEndian::write_i16_into(samples, &mut data);
        PixelBufferBuilder::new()
            .rows(rows)
            .columns(columns)
            .bits_allocated(16)
            .pixel_representation(PixelRepresentation::Signed)
            .data(data)
            .build()
    }

    /// Build an 8-bit interleaved RGB buffer.
    pub fn from_rgb8(samples: Vec<u8>, rows: u16, columns: u16) -> Result<PixelBuffer> {
        PixelBufferBuilder::new()
            .rows(rows)
            .columns(columns)
            .bits_allocated(8)
            .samples_per_pixel(3)
            .photometric_interpretation("RGB")
            .data(samples)
            .build()
    }

    /// Build an 8-bit planar RGB buffer from three equal-length
    /// channel planes, concatenated as R then G then B.
    pub fn from_rgb8_planar(
        red: &[u8],
        green: &[u8],
        blue: &[u8],
        rows: u16,
        columns: u16,
    ) -> Result<PixelBuffer> {
        ensure!(
            red.len() == green.len() && green.len() == blue.len(),
            InvalidPixelDataSnafu {
                field: "channel planes",
                expected: "three planes of equal length",
                actual: format!("{}/{}/{} bytes", red.len(), green.len(), blue.len()),
            }
        );
        let mut data = Vec::with_capacity(red.len() * 3);
        data.extend_from_slice(red);
        data.extend_from_slice(green);
        data.extend_from_slice(blue);
        PixelBufferBuilder::new()
            .rows(rows)
            .columns(columns)
            .bits_allocated(8)
            .samples_per_pixel(3)
            .photometric_interpretation("RGB")
            .planar_configuration(PlanarConfiguration::Planar)
            .data(data)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_fill_in() {
        let buffer = PixelBufferBuilder::new()
            .rows(2)
            .columns(3)
            .bits_allocated(16)
            .bits_stored(12)
            .data(vec![0; 12])
            .build()
            .unwrap();

        let desc = buffer.descriptor();
        assert_eq!(desc.bits_stored, 12);
        assert_eq!(desc.high_bit, 11);
        assert_eq!(desc.number_of_frames, 1);
        assert_eq!(
            desc.photometric_interpretation,
            PhotometricInterpretation::Monochrome2
        );
    }

    #[rstest]
    #[case::zero_rows(0, 2, 8, 4)]
    #[case::zero_columns(2, 0, 8, 4)]
    #[case::zero_bits(2, 2, 0, 4)]
    #[case::short_payload(2, 2, 8, 3)]
    #[case::long_payload(2, 2, 8, 5)]
    fn rejects_inconsistent_descriptions(
        #[case] rows: u16,
        #[case] columns: u16,
        #[case] bits_allocated: u16,
        #[case] payload: usize,
    ) {
        let outcome = PixelBufferBuilder::new()
            .rows(rows)
            .columns(columns)
            .bits_allocated(bits_allocated)
            .data(vec![0; payload])
            .build();
        assert!(outcome.is_err());
    }

    #[test]
    fn rejects_bit_field_disorder() {
        // bits_stored above bits_allocated
        assert!(PixelBufferBuilder::new()
            .rows(1)
            .columns(1)
            .bits_allocated(8)
            .bits_stored(12)
            .data(vec![0])
            .build()
            .is_err());

        // high bit at or above bits_stored
        assert!(PixelBufferBuilder::new()
            .rows(1)
            .columns(1)
            .bits_allocated(8)
            .high_bit(8)
            .data(vec![0])
            .build()
            .is_err());
    }

    #[test]
    fn typed_constructors() {
        let buffer = PixelBuffer::from_mono16(&[1, 2, 3, 4], 2, 2).unwrap();
        assert_eq!(buffer.data(), &[1, 0, 2, 0, 3, 0, 4, 0]);

        let buffer = PixelBuffer::from_mono16_signed(&[-1, 2], 1, 2).unwrap();
        assert_eq!(buffer.data(), &[0xFF, 0xFF, 0x02, 0x00]);
        assert!(buffer.descriptor().is_signed());

        let buffer = PixelBuffer::from_rgb8(vec![1, 2, 3, 4, 5, 6], 1, 2).unwrap();
        assert_eq!(buffer.descriptor().samples_per_pixel, 3);
        assert_eq!(
            buffer.descriptor().planar_configuration,
            PlanarConfiguration::Interleaved
        );

        let buffer = PixelBuffer::from_rgb8_planar(&[1, 2], &[3, 4], &[5, 6], 1, 2).unwrap();
        assert_eq!(buffer.data(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            buffer.descriptor().planar_configuration,
            PlanarConfiguration::Planar
        );

        // channel length mismatch
        assert!(PixelBuffer::from_rgb8_planar(&[1], &[2, 3], &[4], 1, 1).is_err());
    }
}
