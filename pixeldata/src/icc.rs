//! ICC profile header parsing.
//!
//! Only the fixed 128-byte big-endian profile header is interpreted;
//! applying a profile as a color transformation is not implemented
//! and fails cleanly.

use byteorder::{BigEndian, ByteOrder};
use snafu::ensure;

use dcmpix_core::error::{InvalidPixelDataSnafu, Result};
use dcmpix_core::Dataset;

use crate::attribute;
use crate::buffer::PixelBuffer;

use std::fmt;

/// The length of the fixed ICC profile header.
pub const ICC_HEADER_LEN: usize = 128;

/// A four-character code field of the profile header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    fn read(data: &[u8], at: usize) -> FourCc {
        FourCc([data[at], data[at + 1], data[at + 2], data[at + 3]])
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02X}", byte)?;
            }
        }
        Ok(())
    }
}

impl PartialEq<&str> for FourCc {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

/// The rendering intent declared in the profile header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RenderingIntent {
    /// 0
    Perceptual,
    /// 1
    RelativeColorimetric,
    /// 2
    Saturation,
    /// 3
    AbsoluteColorimetric,
}

/// The interpreted fields of an ICC profile header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IccHeader {
    /// the declared size of the whole profile in bytes
    pub profile_size: u32,
    /// profile major and minor version
    pub version: (u8, u8),
    /// the profile/device class, such as `mntr` or `scnr`
    pub profile_class: FourCc,
    /// the data color space of the profile
    pub color_space: FourCc,
    /// the profile connection space, `XYZ ` or `Lab `
    pub connection_space: FourCc,
    /// the rendering intent
    pub rendering_intent: RenderingIntent,
}

impl IccHeader {
    /// Parse the header of an ICC profile byte stream.
    ///
    /// The declared profile size must equal the stream length
    /// and the signature field must read `acsp`.
    pub fn parse(data: &[u8]) -> Result<IccHeader> {
        ensure!(
            data.len() >= ICC_HEADER_LEN,
            InvalidPixelDataSnafu {
                field: "ICCProfile",
                expected: format!("at least {} header bytes", ICC_HEADER_LEN),
                actual: data.len().to_string(),
            }
        );

        let signature = FourCc::read(data, 36);
        ensure!(
            signature == "acsp",
            InvalidPixelDataSnafu {
                field: "ICCProfile",
                expected: "profile signature `acsp`",
                actual: format!("`{}`", signature),
            }
        );

        let profile_size = BigEndian::read_u32(&data[0..4]);
        ensure!(
            profile_size as usize == data.len(),
            InvalidPixelDataSnafu {
                field: "ICCProfile",
                expected: format!("a declared size of {} bytes", data.len()),
                actual: profile_size.to_string(),
            }
        );

        let rendering_intent = match BigEndian::read_u32(&data[64..68]) {
            0 => RenderingIntent::Perceptual,
            1 => RenderingIntent::RelativeColorimetric,
            2 => RenderingIntent::Saturation,
            3 => RenderingIntent::AbsoluteColorimetric,
            other => {
                return InvalidPixelDataSnafu {
                    field: "ICCProfile",
                    expected: "a rendering intent between 0 and 3",
                    actual: other.to_string(),
                }
                .fail()
            }
        };

        Ok(IccHeader {
            profile_size,
            version: (data[8], data[9] >> 4),
            profile_class: FourCc::read(data, 12),
            color_space: FourCc::read(data, 16),
            connection_space: FourCc::read(data, 20),
            rendering_intent,
        })
    }

    /// Parse the header of the data set's _ICC Profile_ attribute,
    /// if one is present.
    pub fn from_dataset<D: Dataset>(ds: &D) -> Option<Result<IccHeader>> {
        attribute::icc_profile(ds).map(IccHeader::parse)
    }

    /// Apply the profile as a color transformation.
    ///
    /// Not implemented: this interface exists so callers can
    /// detect the capability gap instead of silently skipping
    /// color management.
    pub fn transform(&self, _buffer: &PixelBuffer) -> Result<PixelBuffer> {
        InvalidPixelDataSnafu {
            field: "ICCProfile",
            expected: "a color transformation engine",
            actual: "header parsing only",
        }
        .fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A plausible 128-byte display profile header.
    fn sample_profile() -> Vec<u8> {
        let mut data = vec![0u8; ICC_HEADER_LEN];
        BigEndian::write_u32(&mut data[0..4], ICC_HEADER_LEN as u32);
        data[8] = 4; // version 4.3
        data[9] = 0x30;
        data[12..16].copy_from_slice(b"mntr");
        data[16..20].copy_from_slice(b"RGB ");
        data[20..24].copy_from_slice(b"XYZ ");
        data[36..40].copy_from_slice(b"acsp");
        BigEndian::write_u32(&mut data[64..68], 1);
        data
    }

    #[test]
    fn parses_header_fields() {
        let header = IccHeader::parse(&sample_profile()).unwrap();
        assert_eq!(header.profile_size, 128);
        assert_eq!(header.version, (4, 3));
        assert_eq!(header.profile_class, "mntr");
        assert_eq!(header.color_space, "RGB ");
        assert_eq!(header.connection_space, "XYZ ");
        assert_eq!(header.rendering_intent, RenderingIntent::RelativeColorimetric);
    }

    #[test]
    fn rejects_bad_signature_and_size() {
        let mut bad_signature = sample_profile();
        bad_signature[36..40].copy_from_slice(b"nope");
        assert!(IccHeader::parse(&bad_signature).is_err());

        let mut bad_size = sample_profile();
        bad_size.push(0);
        assert!(IccHeader::parse(&bad_size).is_err());

        assert!(IccHeader::parse(&[0; 60]).is_err());
    }

    #[test]
    fn transform_is_a_clear_failure() {
        let header = IccHeader::parse(&sample_profile()).unwrap();
        let buffer = PixelBuffer::from_rgb8(vec![0; 3], 1, 1).unwrap();
        assert!(header.transform(&buffer).is_err());
    }
}
