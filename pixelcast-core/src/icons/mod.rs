//! Icon storage
//!
//! Icons are resolved from the built-in pixel art first, then from a
//! bounded LRU cache of decoded bitmaps that loads misses through the
//! [`AssetSource`](crate::traits::AssetSource) and
//! [`Decoder`](crate::traits::Decoder) collaborators.

pub mod bitmap;
pub mod builtin;
pub mod cache;

pub use bitmap::{Bitmap, BitmapView};
pub use builtin::{builtin, is_builtin};
pub use cache::{CacheStats, IconCache, IconError};
