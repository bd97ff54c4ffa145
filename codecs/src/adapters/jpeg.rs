//! Support for JPEG image decoding (baseline and lossless processes).

use jpeg_decoder::{ColorTransform, Decoder, PixelFormat};
use std::borrow::Cow;
use std::io::Cursor;

use dcmpix_core::error::{DecompressionFailedSnafu, Result};
use dcmpix_core::{PhotometricInterpretation, PixelDescriptor};

use crate::Codec;

/// Pixel data codec for the JPEG family of transfer syntaxes
/// covered by the baseline and lossless coding processes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct JpegCodec {
    uid: &'static str,
}

impl JpegCodec {
    /// Create a JPEG codec claiming the given transfer syntax.
    pub const fn new(uid: &'static str) -> Self {
        JpegCodec { uid }
    }
}

impl Codec for JpegCodec {
    fn transfer_syntax_uid(&self) -> &str {
        self.uid
    }

    /// Decode one self-contained JPEG stream into native pixel bytes.
    ///
    /// Luma/chroma coded images are brought back to RGB
    /// with the fixed-point BT.601 conversion;
    /// 16-bit output is emitted little-endian.
    fn decode<'a>(&self, src: &'a [u8], descriptor: &PixelDescriptor) -> Result<Cow<'a, [u8]>> {
        let fail = |message: String| {
            DecompressionFailedSnafu {
                uid: self.uid,
                message,
            }
            .build()
        };

        let mut decoder = Decoder::new(Cursor::new(src));
        let ybr_coded = matches!(
            descriptor.photometric_interpretation,
            PhotometricInterpretation::YbrFull | PhotometricInterpretation::YbrFull422
        );
        if ybr_coded {
            // keep the coded luma/chroma samples,
            // the conversion below is the normative one
            decoder.set_color_transform(ColorTransform::None);
        }

        let mut pixels = decoder
            .decode()
            .map_err(|e| fail(format!("JPEG decoder failure: {}", e)))?;
        let info = decoder
            .info()
            .ok_or_else(|| fail("JPEG stream carries no image info".into()))?;

        if u32::from(info.width) != u32::from(descriptor.columns)
            || u32::from(info.height) != u32::from(descriptor.rows)
        {
            return Err(fail(format!(
                "decoded dimensions {}x{} do not match the image description {}x{}",
                info.width, info.height, descriptor.columns, descriptor.rows
            )));
        }

        let components: u16 = match info.pixel_format {
            PixelFormat::L8 | PixelFormat::L16 => 1,
            PixelFormat::RGB24 => 3,
            other => return Err(fail(format!("unsupported JPEG pixel format {:?}", other))),
        };
        if components != descriptor.samples_per_pixel {
            return Err(fail(format!(
                "decoded image has {} samples per pixel, {} expected",
                components, descriptor.samples_per_pixel
            )));
        }

        match info.pixel_format {
            PixelFormat::L16 => {
                // the decoder emits big-endian words
                if descriptor.bits_allocated != 16 {
                    return Err(fail(format!(
                        "16-bit JPEG output for BitsAllocated {}",
                        descriptor.bits_allocated
                    )));
                }
                for pair in pixels.chunks_exact_mut(2) {
                    pair.swap(0, 1);
                }
            }
            PixelFormat::L8 | PixelFormat::RGB24 => {
                if descriptor.bits_allocated != 8 {
                    return Err(fail(format!(
                        "8-bit JPEG output for BitsAllocated {}",
                        descriptor.bits_allocated
                    )));
                }
                if ybr_coded && components == 3 {
                    ybr_to_rgb(&mut pixels);
                }
            }
            _ => unreachable!(),
        }

        let expected = descriptor.for_single_frame().expected_len();
        if pixels.len() != expected {
            return Err(fail(format!(
                "decoded frame has {} bytes, {} expected",
                pixels.len(),
                expected
            )));
        }
        Ok(Cow::Owned(pixels))
    }
}

/// In-place fixed-point BT.601 conversion
/// of full-range interleaved YCbCr samples to RGB.
fn ybr_to_rgb(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(3) {
        let y = i32::from(pixel[0]);
        let cb = i32::from(pixel[1]) - 128;
        let cr = i32::from(pixel[2]) - 128;

        let r = y + ((91881 * cr) >> 16);
        let g = y - ((22554 * cb) >> 16) - ((46802 * cr) >> 16);
        let b = y + ((116130 * cb) >> 16);

        pixel[0] = r.clamp(0, 255) as u8;
        pixel[1] = g.clamp(0, 255) as u8;
        pixel[2] = b.clamp(0, 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gray stays gray and primaries land close to their RGB values.
    #[test]
    fn ybr_to_rgb_fixed_point() {
        // mid gray: Y=128, Cb=Cr=128
        let mut px = [128, 128, 128];
        ybr_to_rgb(&mut px);
        assert_eq!(px, [128, 128, 128]);

        // pure red in BT.601: Y=76, Cb=85, Cr=255
        let mut px = [76, 85, 255];
        ybr_to_rgb(&mut px);
        assert!(px[0] >= 253, "red channel was {}", px[0]);
        assert!(px[1] <= 4, "green channel was {}", px[1]);
        assert!(px[2] <= 4, "blue channel was {}", px[2]);

        // white: Y=255, Cb=Cr=128
        let mut px = [255, 128, 128];
        ybr_to_rgb(&mut px);
        assert_eq!(px, [255, 255, 255]);
    }

    #[test]
    fn garbage_input_is_an_error_not_a_panic() {
        let codec = JpegCodec::new(crate::entries::JPEG_BASELINE);
        let descriptor = PixelDescriptor {
            rows: 2,
            columns: 2,
            bits_allocated: 8,
            bits_stored: 8,
            high_bit: 7,
            pixel_representation: dcmpix_core::PixelRepresentation::Unsigned,
            samples_per_pixel: 1,
            photometric_interpretation: PhotometricInterpretation::Monochrome2,
            planar_configuration: dcmpix_core::PlanarConfiguration::Interleaved,
            number_of_frames: 1,
            transfer_syntax_uid: codec.transfer_syntax_uid().to_string(),
        };
        assert!(codec.decode(&[0xFF, 0xD8, 0x00, 0x01], &descriptor).is_err());
        assert!(codec.decode(&[], &descriptor).is_err());
    }
}
