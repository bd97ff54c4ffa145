//! Decoding RLE Lossless through a registry lookup.
#![cfg(feature = "rle")]

use dcmpix_codecs::{entries, CodecRegistry};
use dcmpix_core::{
    PhotometricInterpretation, PixelDescriptor, PixelRepresentation, PlanarConfiguration,
};

fn descriptor_4x4_mono8() -> PixelDescriptor {
    PixelDescriptor {
        rows: 4,
        columns: 4,
        bits_allocated: 8,
        bits_stored: 8,
        high_bit: 7,
        pixel_representation: PixelRepresentation::Unsigned,
        samples_per_pixel: 1,
        photometric_interpretation: PhotometricInterpretation::Monochrome2,
        planar_configuration: PlanarConfiguration::Interleaved,
        number_of_frames: 1,
        transfer_syntax_uid: entries::RLE_LOSSLESS.to_string(),
    }
}

/// A 4x4 8-bit frame encoded as a single 16-byte literal run
/// comes back as the identical byte sequence.
#[test]
fn rle_single_literal_segment_round_trip() {
    let pixels: Vec<u8> = (0x01..=0x10).collect();

    let mut encoded = vec![0u8; 64];
    encoded[0] = 1; // one segment
    encoded[4] = 64; // starting right after the header
    encoded.push(15); // literal run of 16 bytes
    encoded.extend_from_slice(&pixels);

    let codec = CodecRegistry::lookup(entries::RLE_LOSSLESS).unwrap();
    let decoded = codec.decode(&encoded, &descriptor_4x4_mono8()).unwrap();
    assert_eq!(decoded, pixels);
}
