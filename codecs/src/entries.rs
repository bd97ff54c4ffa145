//! Compiled transfer syntax identifiers.
//!
//! The UID strings are bit-exact copies of the DICOM registry values;
//! registry lookups tolerate the trailing space or NUL padding
//! which UI strings carry on the wire.

/// Implicit VR Little Endian
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
/// Explicit VR Little Endian
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
/// Explicit VR Big Endian
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";
/// Deflated Explicit VR Little Endian
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";

/// RLE Lossless
pub const RLE_LOSSLESS: &str = "1.2.840.10008.1.2.5";

/// JPEG Baseline (Process 1)
pub const JPEG_BASELINE: &str = "1.2.840.10008.1.2.4.50";
/// JPEG Extended (Process 2 & 4)
pub const JPEG_EXTENDED: &str = "1.2.840.10008.1.2.4.51";
/// JPEG Lossless, Non-Hierarchical (Process 14)
pub const JPEG_LOSSLESS_NON_HIERARCHICAL: &str = "1.2.840.10008.1.2.4.57";
/// JPEG Lossless, Non-Hierarchical, First-Order Prediction
pub const JPEG_LOSSLESS_FIRST_ORDER_PREDICTION: &str = "1.2.840.10008.1.2.4.70";

/// JPEG 2000 Image Compression (Lossless Only)
pub const JPEG_2000_LOSSLESS_ONLY: &str = "1.2.840.10008.1.2.4.90";
/// JPEG 2000 Image Compression
pub const JPEG_2000: &str = "1.2.840.10008.1.2.4.91";
/// High-Throughput JPEG 2000 Image Compression (Lossless Only)
pub const HTJ2K_LOSSLESS_ONLY: &str = "1.2.840.10008.1.2.4.201";
/// High-Throughput JPEG 2000 Image Compression
pub const HTJ2K: &str = "1.2.840.10008.1.2.4.203";

/// The four transfer syntaxes whose pixel data is not encapsulated.
pub const NATIVE_TRANSFER_SYNTAXES: [&str; 4] = [
    IMPLICIT_VR_LITTLE_ENDIAN,
    EXPLICIT_VR_LITTLE_ENDIAN,
    EXPLICIT_VR_BIG_ENDIAN,
    DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
];

/// Strip the trailing whitespace or NUL padding from a UID string.
pub fn trim_uid(uid: &str) -> &str {
    uid.trim_end_matches(|c: char| c.is_whitespace() || c == '\0')
}

/// Whether the given transfer syntax stores pixel data
/// as a flat raster rather than an encapsulated fragment sequence.
pub fn is_native(uid: &str) -> bool {
    let uid = trim_uid(uid);
    NATIVE_TRANSFER_SYNTAXES.iter().any(|&n| n == uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_split() {
        assert!(is_native("1.2.840.10008.1.2"));
        assert!(is_native("1.2.840.10008.1.2.1"));
        assert!(is_native("1.2.840.10008.1.2.2"));
        assert!(is_native("1.2.840.10008.1.2.1.99"));
        // padded forms are accepted
        assert!(is_native("1.2.840.10008.1.2.1\0"));
        assert!(is_native("1.2.840.10008.1.2.1 "));

        assert!(!is_native(RLE_LOSSLESS));
        assert!(!is_native(JPEG_BASELINE));
        assert!(!is_native(JPEG_2000));
        assert!(!is_native(HTJ2K));
    }
}
