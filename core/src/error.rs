//! Common error type for pixel data operations.
//!
//! All fallible operations across the `dcmpix` crates
//! resolve to one of the five conditions below.
//! Failures from external decoder libraries are translated into
//! [`DecompressionFailed`](Error::DecompressionFailed)
//! before crossing the crate boundary;
//! malformed input never panics.

use crate::Tag;
use snafu::{Backtrace, Snafu};

/// Error type for pixel data operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    /// The _Pixel Data_ attribute is absent from the data set.
    #[snafu(display("PixelData attribute (7FE0,0010) is missing"))]
    PixelDataNotFound { backtrace: Backtrace },

    /// A required attribute other than _Pixel Data_ is absent.
    #[snafu(display("Missing required attribute `{}` {}", name, tag))]
    MissingRequiredAttribute {
        /// the attribute keyword
        name: &'static str,
        /// the attribute tag
        tag: Tag,
        backtrace: Backtrace,
    },

    /// A value, length, or structure is inconsistent
    /// with the rest of the pixel data description.
    #[snafu(display("Invalid pixel data in `{}`: expected {}, found {}", field, expected, actual))]
    InvalidPixelData {
        /// the offending field or property
        field: String,
        /// what a consistent value would look like
        expected: String,
        /// what was actually found
        actual: String,
        backtrace: Backtrace,
    },

    /// No codec is registered for the transfer syntax.
    #[snafu(display("Unsupported transfer syntax `{}`", uid))]
    UnsupportedTransferSyntax {
        /// the transfer syntax UID
        uid: String,
        backtrace: Backtrace,
    },

    /// A codec rejected the compressed byte stream.
    #[snafu(display("Could not decompress pixel data ({}): {}", uid, message))]
    DecompressionFailed {
        /// the transfer syntax UID of the codec
        uid: String,
        /// the underlying cause
        message: String,
        backtrace: Backtrace,
    },
}

/// The result of a pixel data operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    fn is_send_and_sync<T>()
    where
        T: Send + Sync,
    {
    }

    #[test]
    fn error_is_send_and_sync() {
        is_send_and_sync::<Error>();
    }

    #[test]
    fn error_messages_carry_context() {
        let e = InvalidPixelDataSnafu {
            field: "bits_allocated",
            expected: "8 or 16",
            actual: "12",
        }
        .build();
        assert_eq!(
            e.to_string(),
            "Invalid pixel data in `bits_allocated`: expected 8 or 16, found 12"
        );

        let e = MissingRequiredAttributeSnafu {
            name: "Rows",
            tag: crate::tags::ROWS,
        }
        .build();
        assert_eq!(e.to_string(), "Missing required attribute `Rows` (0028,0010)");
    }
}
