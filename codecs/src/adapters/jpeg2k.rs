//! Support for JPEG 2000 and High-Throughput JPEG 2000 image decoding.

use jpeg2k::Image;
use std::borrow::Cow;
use tracing::warn;

use dcmpix_core::error::{DecompressionFailedSnafu, Result};
use dcmpix_core::PixelDescriptor;

use crate::Codec;

/// Pixel data codec for the transfer syntaxes based on JPEG 2000,
/// including the High-Throughput profiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Jpeg2000Codec {
    uid: &'static str,
}

impl Jpeg2000Codec {
    /// Create a JPEG 2000 codec claiming the given transfer syntax.
    pub const fn new(uid: &'static str) -> Self {
        Jpeg2000Codec { uid }
    }
}

impl Codec for Jpeg2000Codec {
    fn transfer_syntax_uid(&self) -> &str {
        self.uid
    }

    /// Decode one frame from a raw J2K codestream or a JP2 wrapper.
    ///
    /// Components are assembled into an interleaved byte sequence,
    /// little-endian for samples wider than 8 bits.
    fn decode<'a>(&self, src: &'a [u8], descriptor: &PixelDescriptor) -> Result<Cow<'a, [u8]>> {
        let fail = |message: String| {
            DecompressionFailedSnafu {
                uid: self.uid,
                message,
            }
            .build()
        };

        if descriptor.bits_allocated != 8 && descriptor.bits_allocated != 16 {
            return Err(fail(format!(
                "BitsAllocated of {} is not supported, must be 8 or 16",
                descriptor.bits_allocated
            )));
        }

        let image =
            Image::from_bytes(src).map_err(|e| fail(format!("JPEG 2000 decoder failure: {}", e)))?;

        if image.width() != u32::from(descriptor.columns)
            || image.height() != u32::from(descriptor.rows)
        {
            return Err(fail(format!(
                "decoded dimensions {}x{} do not match the image description {}x{}",
                image.width(),
                image.height(),
                descriptor.columns,
                descriptor.rows
            )));
        }

        let components = image.components();
        let samples_per_pixel = usize::from(descriptor.samples_per_pixel);
        if components.len() < samples_per_pixel {
            return Err(fail(format!(
                "decoded image has {} components, {} expected",
                components.len(),
                samples_per_pixel
            )));
        }
        if components.len() > samples_per_pixel {
            warn!(
                "JPEG 2000 image has more components than expected ({} > {}), extras ignored",
                components.len(),
                samples_per_pixel
            );
        }

        let bytes_per_sample = descriptor.bytes_per_sample();
        let pixels = usize::from(descriptor.rows) * usize::from(descriptor.columns);
        let mut dst = vec![0; pixels * samples_per_pixel * bytes_per_sample];

        for (component_i, component) in components.iter().take(samples_per_pixel).enumerate() {
            let data = component.data();
            if data.len() != pixels {
                return Err(fail(format!(
                    "component #{} has {} samples, {} expected",
                    component_i,
                    data.len(),
                    pixels
                )));
            }
            for (i, sample) in data.iter().enumerate() {
                let offset = (i * samples_per_pixel + component_i) * bytes_per_sample;
                dst[offset..offset + bytes_per_sample]
                    .copy_from_slice(&sample.to_le_bytes()[..bytes_per_sample]);
            }
        }

        Ok(Cow::Owned(dst))
    }
}
