//! Support for RLE Lossless image decoding.
//!
//! The encoded stream is organized as up to 15 PackBits-compressed
//! byte segments, one per sample byte plane
//! (most significant first within each sample).

use byteorder::{ByteOrder, LittleEndian};
use std::borrow::Cow;

use dcmpix_core::error::{DecompressionFailedSnafu, Result};
use dcmpix_core::PixelDescriptor;

use crate::{entries, Codec};

/// The fixed size of the RLE segment header.
const HEADER_LEN: usize = 64;
/// The maximum number of segments a header can describe.
const MAX_SEGMENTS: usize = 15;

/// Pixel data codec for the RLE Lossless transfer syntax.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RleLosslessCodec;

impl Codec for RleLosslessCodec {
    fn transfer_syntax_uid(&self) -> &str {
        entries::RLE_LOSSLESS
    }

    /// Decode one RLE Lossless frame.
    ///
    /// Segment `s` of the stream carries byte `s` of each sample
    /// in most-significant-first order;
    /// the decoded bytes are scattered back into
    /// little-endian interleaved samples.
    fn decode<'a>(&self, src: &'a [u8], descriptor: &PixelDescriptor) -> Result<Cow<'a, [u8]>> {
        let fail = |message: String| DecompressionFailedSnafu {
            uid: entries::RLE_LOSSLESS,
            message,
        };

        let bytes_per_sample = match descriptor.bits_allocated {
            8 | 16 => descriptor.bytes_per_sample(),
            other => {
                return fail(format!(
                    "BitsAllocated of {} is not supported, must be 8 or 16",
                    other
                ))
                .fail()
            }
        };
        let samples_per_pixel = usize::from(descriptor.samples_per_pixel);
        let pixels = usize::from(descriptor.rows) * usize::from(descriptor.columns);

        if src.len() < HEADER_LEN {
            return fail(format!(
                "RLE header requires {} bytes, found {}",
                HEADER_LEN,
                src.len()
            ))
            .fail();
        }
        let segment_count = LittleEndian::read_u32(&src[0..4]) as usize;
        if !(1..=MAX_SEGMENTS).contains(&segment_count) {
            return fail(format!("invalid RLE segment count {}", segment_count)).fail();
        }
        if segment_count != samples_per_pixel * bytes_per_sample {
            return fail(format!(
                "RLE stream has {} segments, {} expected for the image description",
                segment_count,
                samples_per_pixel * bytes_per_sample
            ))
            .fail();
        }

        let mut offsets = vec![0u32; segment_count];
        LittleEndian::read_u32_into(&src[4..4 * (segment_count + 1)], &mut offsets);
        offsets.push(src.len() as u32);
        for window in offsets.windows(2) {
            if window[0] < HEADER_LEN as u32 || window[0] > window[1] {
                return fail(format!("invalid RLE segment offset {}", window[0])).fail();
            }
        }

        let mut dst = vec![0; pixels * samples_per_pixel * bytes_per_sample];
        let stride = bytes_per_sample * samples_per_pixel;

        for sample in 0..samples_per_pixel {
            for seg in 0..bytes_per_sample {
                // segment order is most significant byte first;
                // output samples are little-endian
                let ii = sample * bytes_per_sample + seg;
                let segment = &src[offsets[ii] as usize..offsets[ii + 1] as usize];
                let decoded = decode_packbits(segment, pixels)
                    .map_err(|e| fail(format!("segment #{}: {}", ii, e)).build())?;
                if decoded.len() != pixels {
                    return fail(format!(
                        "segment #{} decoded to {} bytes, {} expected",
                        ii,
                        decoded.len(),
                        pixels
                    ))
                    .fail();
                }

                let byte_pos = sample * bytes_per_sample + (bytes_per_sample - 1 - seg);
                for (value, chunk) in decoded.iter().zip(dst[byte_pos..].iter_mut().step_by(stride))
                {
                    *chunk = *value;
                }
            }
        }

        Ok(Cow::Owned(dst))
    }
}

/// Decode a PackBits byte stream into at most `limit` bytes.
///
/// A control byte `c` in `[0, 127]` copies the next `c + 1` bytes literally,
/// `c` in `[-127, -1]` repeats the next byte `1 - c` times,
/// and `-128` is a no-op.
fn decode_packbits(mut src: &[u8], limit: usize) -> std::result::Result<Vec<u8>, String> {
    let mut dst = Vec::with_capacity(limit);
    while let Some((&control, rest)) = src.split_first() {
        if dst.len() >= limit {
            break;
        }
        let control = control as i8;
        if control >= 0 {
            let n = control as usize + 1;
            if rest.len() < n {
                return Err(format!("literal run of {} bytes is truncated", n));
            }
            dst.extend_from_slice(&rest[..n]);
            src = &rest[n..];
        } else if control != -128 {
            let n = (1 - control as isize) as usize;
            let (&value, rest) = rest
                .split_first()
                .ok_or_else(|| "replicate run is missing its value byte".to_string())?;
            dst.resize(dst.len() + n, value);
            src = rest;
        } else {
            src = rest;
        }
    }
    dst.truncate(limit);
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmpix_core::{PhotometricInterpretation, PixelRepresentation, PlanarConfiguration};

    fn descriptor(
        rows: u16,
        columns: u16,
        bits_allocated: u16,
        samples_per_pixel: u16,
    ) -> PixelDescriptor {
        PixelDescriptor {
            rows,
            columns,
            bits_allocated,
            bits_stored: bits_allocated,
            high_bit: bits_allocated - 1,
            pixel_representation: PixelRepresentation::Unsigned,
            samples_per_pixel,
            photometric_interpretation: if samples_per_pixel == 3 {
                PhotometricInterpretation::Rgb
            } else {
                PhotometricInterpretation::Monochrome2
            },
            planar_configuration: PlanarConfiguration::Interleaved,
            number_of_frames: 1,
            transfer_syntax_uid: entries::RLE_LOSSLESS.to_string(),
        }
    }

    /// Build an RLE header for the given segment offsets.
    fn rle_header(offsets: &[u32]) -> Vec<u8> {
        let mut header = vec![0u8; HEADER_LEN];
        LittleEndian::write_u32(&mut header[0..4], offsets.len() as u32);
        for (i, offset) in offsets.iter().enumerate() {
            LittleEndian::write_u32(&mut header[4 + i * 4..8 + i * 4], *offset);
        }
        header
    }

    #[test]
    fn packbits_literal_and_replicate_runs() {
        let encoded = [
            0xFE, 0xAA, 0x02, 0x80, 0x00, 0x2A, 0xFD, 0xAA, 0x03, 0x80, 0x00, 0x2A, 0x22, 0xF7,
            0xAA,
        ];
        let expected = [
            0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0xAA, 0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0x22,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        ];
        assert_eq!(decode_packbits(&encoded, 100).unwrap(), expected);
    }

    /// A 4x4 8-bit frame held in one literal run decodes to itself.
    #[test]
    fn single_segment_literal_run() {
        let pixels: Vec<u8> = (0x01..=0x10).collect();
        let mut src = rle_header(&[HEADER_LEN as u32]);
        src.push(15); // literal run of 16 bytes
        src.extend_from_slice(&pixels);

        let decoded = RleLosslessCodec.decode(&src, &descriptor(4, 4, 8, 1)).unwrap();
        assert_eq!(decoded, pixels);
    }

    /// 16-bit data is split into MSB and LSB segments
    /// and comes back interleaved little-endian.
    #[test]
    fn two_segments_interleave_as_little_endian() {
        // 2x2 16-bit samples 0x0102, 0x0304, 0x0506, 0x0708
        let msb = [0x01, 0x03, 0x05, 0x07];
        let lsb = [0x02, 0x04, 0x06, 0x08];
        let mut src = rle_header(&[64, 64 + 5]);
        src.push(3);
        src.extend_from_slice(&msb);
        src.push(3);
        src.extend_from_slice(&lsb);

        let decoded = RleLosslessCodec.decode(&src, &descriptor(2, 2, 16, 1)).unwrap();
        assert_eq!(
            decoded,
            vec![0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07]
        );
    }

    /// Color segments come back as interleaved RGB triplets.
    #[test]
    fn three_segments_interleave_as_rgb() {
        let reds = [10, 11, 12, 13];
        let greens = [20, 21, 22, 23];
        let blues = [30, 31, 32, 33];
        let mut src = rle_header(&[64, 64 + 5, 64 + 10]);
        for plane in [reds, greens, blues] {
            src.push(3);
            src.extend_from_slice(&plane);
        }

        let decoded = RleLosslessCodec.decode(&src, &descriptor(2, 2, 8, 3)).unwrap();
        assert_eq!(
            decoded,
            vec![10, 20, 30, 11, 21, 31, 12, 22, 32, 13, 23, 33]
        );
    }

    #[test]
    fn rejects_inconsistent_headers() {
        // zero segments
        let src = rle_header(&[]);
        assert!(RleLosslessCodec.decode(&src, &descriptor(2, 2, 8, 1)).is_err());

        // segment count disagrees with the descriptor
        let mut src = rle_header(&[64]);
        src.push(3);
        src.extend_from_slice(&[0; 4]);
        assert!(RleLosslessCodec.decode(&src, &descriptor(2, 2, 16, 1)).is_err());

        // offset pointing into the header
        let mut src = rle_header(&[32]);
        src.push(3);
        src.extend_from_slice(&[0; 4]);
        assert!(RleLosslessCodec.decode(&src, &descriptor(2, 2, 8, 1)).is_err());

        // truncated input
        assert!(RleLosslessCodec
            .decode(&[0; 10], &descriptor(2, 2, 8, 1))
            .is_err());
    }

    /// A segment which decodes short of a full plane is rejected, not padded.
    #[test]
    fn rejects_short_segments() {
        let mut src = rle_header(&[64]);
        src.push(1); // only 2 of the 4 expected bytes
        src.extend_from_slice(&[0xAB, 0xCD]);
        assert!(RleLosslessCodec.decode(&src, &descriptor(2, 2, 8, 1)).is_err());
    }
}
