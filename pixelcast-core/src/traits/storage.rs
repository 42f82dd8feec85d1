//! Persistent storage abstractions
//!
//! Key-value blob storage that board crates implement on top of their
//! flash or filesystem.

/// Storage keys for persisted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Snapshot of user apps (binary postcard format)
    Apps = 1,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Underlying device failed
    Device,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Storage is full
    Full,
}

/// Blob storage trait
///
/// Writes replace the previous value of the key as a whole.
pub trait SnapshotStore {
    /// Read a value by key into `buffer`
    ///
    /// Returns the number of bytes read.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StoreError>;

    /// Write a value by key
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_values_stable() {
        // Stored blobs outlive firmware updates
        assert_eq!(StorageKey::Apps.as_u8(), 1);
    }
}
