//! Collaborator traits
//!
//! These traits define the interface between the scheduling core and the
//! board-specific pieces: image decoding, the asset filesystem, the clock,
//! font metrics and persistent storage.

pub mod asset;
pub mod clock;
pub mod decoder;
pub mod metrics;
pub mod storage;

pub use asset::{AssetError, AssetSource};
pub use clock::MonotonicClock;
pub use decoder::{DecodeError, Decoder};
pub use metrics::TextMetrics;
pub use storage::{SnapshotStore, StorageKey, StoreError};
