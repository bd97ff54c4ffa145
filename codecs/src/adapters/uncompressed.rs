//! Pass-through codec for the uncompressed transfer syntaxes.

use std::borrow::Cow;

use dcmpix_core::error::Result;
use dcmpix_core::PixelDescriptor;

use crate::Codec;

/// Codec for pixel data which is already in native form.
///
/// One instance is registered per uncompressed transfer syntax UID;
/// decoding returns the input unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NativeCodec {
    uid: &'static str,
}

impl NativeCodec {
    /// Create a pass-through codec claiming the given transfer syntax.
    pub const fn new(uid: &'static str) -> Self {
        NativeCodec { uid }
    }
}

impl Codec for NativeCodec {
    fn transfer_syntax_uid(&self) -> &str {
        self.uid
    }

    fn decode<'a>(&self, src: &'a [u8], _descriptor: &PixelDescriptor) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(src))
    }
}
