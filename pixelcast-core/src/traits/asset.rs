//! Asset source trait

/// Errors when reading an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssetError {
    /// No asset with that name
    NotFound,
    /// Asset is larger than the provided buffer
    TooLarge,
}

/// Read-only store of named assets (icon files on the device filesystem)
pub trait AssetSource {
    /// Read the asset `name` into `buf`
    ///
    /// Returns the number of bytes read. Must not return a partial asset:
    /// an asset that does not fit is `TooLarge`.
    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, AssetError>;
}
