//! Failing stand-ins for codecs compiled out of the build.

use std::borrow::Cow;

use dcmpix_core::error::{DecompressionFailedSnafu, Result};
use dcmpix_core::PixelDescriptor;

use crate::Codec;

/// A codec placeholder for a transfer syntax
/// whose decoder support was not built in.
///
/// Looking it up succeeds,
/// so callers can distinguish "not a known transfer syntax"
/// from "known, but this build cannot decode it";
/// every decode attempt fails with the reason.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StubCodec {
    uid: &'static str,
    name: &'static str,
}

impl StubCodec {
    /// Create a stub for the named transfer syntax.
    pub const fn new(uid: &'static str, name: &'static str) -> Self {
        StubCodec { uid, name }
    }
}

impl Codec for StubCodec {
    fn transfer_syntax_uid(&self) -> &str {
        self.uid
    }

    fn decode<'a>(&self, _src: &'a [u8], _descriptor: &PixelDescriptor) -> Result<Cow<'a, [u8]>> {
        DecompressionFailedSnafu {
            uid: self.uid,
            message: format!("support for {} is not built in", self.name),
        }
        .fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmpix_core::Error;

    #[test]
    fn always_fails_with_cause() {
        let codec = StubCodec::new("1.2.840.10008.1.2.4.91", "JPEG 2000");
        let descriptor = PixelDescriptor {
            rows: 1,
            columns: 1,
            bits_allocated: 8,
            bits_stored: 8,
            high_bit: 7,
            pixel_representation: dcmpix_core::PixelRepresentation::Unsigned,
            samples_per_pixel: 1,
            photometric_interpretation: dcmpix_core::PhotometricInterpretation::Monochrome2,
            planar_configuration: dcmpix_core::PlanarConfiguration::Interleaved,
            number_of_frames: 1,
            transfer_syntax_uid: codec.transfer_syntax_uid().to_string(),
        };
        match codec.decode(&[0], &descriptor) {
            Err(Error::DecompressionFailed { uid, message, .. }) => {
                assert_eq!(uid, "1.2.840.10008.1.2.4.91");
                assert!(message.contains("not built in"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
