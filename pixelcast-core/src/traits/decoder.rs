//! Image decoder trait

/// Errors from an image decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Not an image the decoder understands
    Format,
    /// Image data ended early or is corrupt
    Corrupted,
    /// Output buffer does not match the image dimensions
    BufferSize,
}

/// Trait for decoding encoded images (PNG, GIF, ...) into RGB565
///
/// Decoding is split in two so the caller can check dimensions and
/// allocate the pixel buffer before any pixels are produced.
pub trait Decoder {
    /// Read the image dimensions from the header
    ///
    /// Returns `(width, height)` in pixels.
    fn dimensions(&mut self, bytes: &[u8]) -> Result<(u16, u16), DecodeError>;

    /// Decode the image into `out`, row-major
    ///
    /// `out` holds exactly `width * height` pixels as reported by
    /// [`Decoder::dimensions`].
    fn decode_into(&mut self, bytes: &[u8], out: &mut [u16]) -> Result<(), DecodeError>;
}
