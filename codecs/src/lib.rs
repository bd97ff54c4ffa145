#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(missing_debug_implementations, unused_qualifications, unused_import_braces)]
//! Transfer syntax registry and pixel data codecs.
//!
//! This crate maps transfer syntax UIDs to [`Codec`] implementations
//! through a process-wide [`CodecRegistry`],
//! and provides the codecs themselves:
//! the pass-through codec for the uncompressed transfer syntaxes,
//! RLE Lossless,
//! the JPEG baseline and lossless processes (feature `jpeg`),
//! and JPEG 2000 / High-Throughput JPEG 2000
//! (features `openjp2` or `openjpeg-sys`).
//! Codecs compiled out of the build are registered as stubs
//! which fail with the reason on every decode attempt,
//! so lookups still succeed for the known UIDs.
//!
//! The encapsulated pixel data container format is handled in
//! [`fragments`]:
//! splitting the byte stream into the basic offset table and fragments,
//! and grouping fragments into frames.
//!
//! ```
//! use dcmpix_codecs::{entries, CodecRegistry};
//!
//! let codec = CodecRegistry::lookup(entries::RLE_LOSSLESS)?;
//! assert_eq!(codec.transfer_syntax_uid(), "1.2.840.10008.1.2.5");
//! # Ok::<(), dcmpix_core::Error>(())
//! ```

use lazy_static::lazy_static;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use dcmpix_core::error::{Result, UnsupportedTransferSyntaxSnafu};
use dcmpix_core::PixelDescriptor;

pub mod adapters;
pub mod entries;
mod fragments;

pub use fragments::{Fragment, FragmentStream};

use adapters::stub::StubCodec;
use adapters::uncompressed::NativeCodec;

/// A pixel data decoder for one transfer syntax.
///
/// Implementations hold no mutable state
/// and are safe to share across threads;
/// a decode call allocates at most one output buffer
/// of the size implied by the descriptor.
pub trait Codec: Send + Sync {
    /// The transfer syntax UID this codec decodes.
    fn transfer_syntax_uid(&self) -> &str;

    /// Decode one frame of pixel data
    /// (or, for the uncompressed syntaxes, the whole raster)
    /// into native little-endian interleaved bytes.
    ///
    /// The descriptor describes the expected outcome;
    /// `number_of_frames` is 1 when called frame by frame.
    /// Codecs whose input is already in native form
    /// may return the borrowed input without allocating.
    fn decode<'a>(&self, src: &'a [u8], descriptor: &PixelDescriptor) -> Result<Cow<'a, [u8]>>;
}

/// Alias for a shared, dynamically dispatched codec.
pub type DynCodec = Arc<dyn Codec>;

fn built_in_codecs() -> HashMap<String, DynCodec> {
    let mut codecs: HashMap<String, DynCodec> = HashMap::with_capacity(16);
    let mut add = |codec: DynCodec| {
        codecs.insert(codec.transfer_syntax_uid().to_string(), codec);
    };

    for uid in entries::NATIVE_TRANSFER_SYNTAXES {
        add(Arc::new(NativeCodec::new(uid)));
    }

    #[cfg(feature = "rle")]
    add(Arc::new(adapters::rle_lossless::RleLosslessCodec));
    #[cfg(not(feature = "rle"))]
    add(Arc::new(StubCodec::new(entries::RLE_LOSSLESS, "RLE Lossless")));

    #[cfg(feature = "jpeg")]
    {
        for uid in [
            entries::JPEG_BASELINE,
            entries::JPEG_EXTENDED,
            entries::JPEG_LOSSLESS_NON_HIERARCHICAL,
            entries::JPEG_LOSSLESS_FIRST_ORDER_PREDICTION,
        ] {
            add(Arc::new(adapters::jpeg::JpegCodec::new(uid)));
        }
    }
    #[cfg(not(feature = "jpeg"))]
    {
        add(Arc::new(StubCodec::new(entries::JPEG_BASELINE, "JPEG baseline")));
        add(Arc::new(StubCodec::new(entries::JPEG_EXTENDED, "JPEG extended")));
        add(Arc::new(StubCodec::new(
            entries::JPEG_LOSSLESS_NON_HIERARCHICAL,
            "JPEG lossless",
        )));
        add(Arc::new(StubCodec::new(
            entries::JPEG_LOSSLESS_FIRST_ORDER_PREDICTION,
            "JPEG lossless",
        )));
    }

    #[cfg(any(feature = "openjp2", feature = "openjpeg-sys"))]
    {
        for uid in [
            entries::JPEG_2000_LOSSLESS_ONLY,
            entries::JPEG_2000,
            entries::HTJ2K_LOSSLESS_ONLY,
            entries::HTJ2K,
        ] {
            add(Arc::new(adapters::jpeg2k::Jpeg2000Codec::new(uid)));
        }
    }
    #[cfg(not(any(feature = "openjp2", feature = "openjpeg-sys")))]
    {
        add(Arc::new(StubCodec::new(
            entries::JPEG_2000_LOSSLESS_ONLY,
            "JPEG 2000",
        )));
        add(Arc::new(StubCodec::new(entries::JPEG_2000, "JPEG 2000")));
        add(Arc::new(StubCodec::new(
            entries::HTJ2K_LOSSLESS_ONLY,
            "High-Throughput JPEG 2000",
        )));
        add(Arc::new(StubCodec::new(entries::HTJ2K, "High-Throughput JPEG 2000")));
    }

    codecs
}

lazy_static! {
    static ref REGISTRY: RwLock<HashMap<String, DynCodec>> = RwLock::new(built_in_codecs());
}

/// Zero-sized representative of the process-wide codec registry.
///
/// The registry starts out populated with the built-in codecs
/// and is read-mostly afterwards;
/// lookups take a shared lock and may proceed concurrently,
/// registrations take the exclusive lock.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CodecRegistry;

impl CodecRegistry {
    /// Obtain the codec registered for the given transfer syntax.
    ///
    /// Trailing whitespace or NUL padding in the UID is ignored.
    pub fn lookup(uid: &str) -> Result<DynCodec> {
        let trimmed = entries::trim_uid(uid);
        REGISTRY
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(trimmed)
            .cloned()
            .ok_or_else(|| UnsupportedTransferSyntaxSnafu { uid: trimmed }.build())
    }

    /// Register a codec under its own transfer syntax UID,
    /// replacing any codec previously registered for it.
    pub fn register(codec: DynCodec) {
        let uid = entries::trim_uid(codec.transfer_syntax_uid()).to_string();
        REGISTRY
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(uid, codec);
    }

    /// Remove the codec registered for the given transfer syntax.
    ///
    /// Returns whether a codec was present.
    pub fn unregister(uid: &str) -> bool {
        REGISTRY
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(entries::trim_uid(uid))
            .is_some()
    }

    /// The UIDs with a registered codec, in no particular order.
    pub fn registered_uids() -> Vec<String> {
        REGISTRY
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmpix_core::Error;

    #[test]
    fn has_built_in_codecs() {
        for uid in entries::NATIVE_TRANSFER_SYNTAXES {
            let codec = CodecRegistry::lookup(uid).expect("native codec should be registered");
            assert_eq!(codec.transfer_syntax_uid(), uid);
        }
        // padded UIDs resolve too
        assert!(CodecRegistry::lookup("1.2.840.10008.1.2.5\0").is_ok());
        assert!(CodecRegistry::lookup("1.2.840.10008.1.2.4.50 ").is_ok());
        assert!(CodecRegistry::lookup(entries::JPEG_2000).is_ok());
        assert!(CodecRegistry::lookup(entries::HTJ2K).is_ok());
    }

    #[test]
    fn unknown_uid_is_unsupported() {
        match CodecRegistry::lookup("1.2.840.10008.1.2.4.100") {
            Err(Error::UnsupportedTransferSyntax { uid, .. }) => {
                assert_eq!(uid, "1.2.840.10008.1.2.4.100");
            }
            other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn registration_replaces_and_unregisters() {
        const UID: &str = "1.999.9.1";

        assert!(CodecRegistry::lookup(UID).is_err());
        CodecRegistry::register(Arc::new(StubCodec::new(UID, "first")));
        CodecRegistry::register(Arc::new(StubCodec::new(UID, "second")));

        let codec = CodecRegistry::lookup(UID).unwrap();
        let descriptor = test_descriptor();
        let message = match codec.decode(&[], &descriptor) {
            Err(Error::DecompressionFailed { message, .. }) => message,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert!(message.contains("second"));

        assert!(CodecRegistry::unregister(UID));
        assert!(!CodecRegistry::unregister(UID));
        assert!(CodecRegistry::lookup(UID).is_err());
    }

    #[test]
    fn concurrent_lookups() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    for _ in 0..100 {
                        CodecRegistry::lookup(entries::IMPLICIT_VR_LITTLE_ENDIAN).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    fn test_descriptor() -> PixelDescriptor {
        PixelDescriptor {
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
            transfer_syntax_uid: "1.999.9.1".to_string(),
        }
    }
}
