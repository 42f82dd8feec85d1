//! LRU icon cache
//!
//! Holds at most `N` decoded bitmaps. A miss reads the encoded asset into a
//! bounded scratch buffer, decodes it and takes the first free slot or the
//! least recently used one. A failed load leaves every slot untouched.

use alloc::vec::Vec;
use heapless::String;

use super::bitmap::{Bitmap, BitmapView};
use crate::config::{IconSettings, MAX_ICON_CACHE, MAX_ICON_NAME_LEN};
use crate::traits::{AssetError, AssetSource, DecodeError, Decoder};

/// Icon lookup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IconError {
    /// No asset with that name
    NotFound,
    /// Encoded asset or decoded dimensions over the configured limit
    TooLarge,
    /// Decoder rejected the data
    Decode,
    /// Pixel or scratch buffer could not be allocated
    OutOfMemory,
}

impl From<AssetError> for IconError {
    fn from(e: AssetError) -> Self {
        match e {
            AssetError::NotFound => IconError::NotFound,
            AssetError::TooLarge => IconError::TooLarge,
        }
    }
}

impl From<DecodeError> for IconError {
    fn from(_: DecodeError) -> Self {
        IconError::Decode
    }
}

/// Cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
    pub evictions: u32,
    /// Misses that failed to load
    pub failures: u32,
}

/// One decoded icon
#[derive(Debug, Clone)]
struct CachedIcon {
    name: String<MAX_ICON_NAME_LEN>,
    bitmap: Bitmap,
    last_used: u32,
}

/// Bounded cache of decoded icons
#[derive(Debug)]
pub struct IconCache<const N: usize = MAX_ICON_CACHE> {
    /// Slots; `None` is free
    slots: [Option<CachedIcon>; N],
    limits: IconSettings,
    /// Encoded asset bytes, allocated on the first miss
    scratch: Vec<u8>,
    stats: CacheStats,
}

impl<const N: usize> IconCache<N> {
    pub fn new(limits: IconSettings) -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            limits,
            scratch: Vec::new(),
            stats: CacheStats::default(),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of cached icons
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Check for a cached icon without touching its recency
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Pixel bytes held by all cached icons
    pub fn resident_bytes(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .map(|icon| icon.bitmap.byte_len())
            .sum()
    }

    /// Change the load limits, dropping every cached icon
    pub fn set_limits(&mut self, limits: IconSettings) {
        if self.limits != limits {
            self.limits = limits;
            self.scratch = Vec::new();
            self.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|icon| icon.name.as_str() == name))
    }

    /// Get an icon, loading it on a miss
    pub fn get<A, D>(
        &mut self,
        name: &str,
        now: u32,
        source: &mut A,
        decoder: &mut D,
    ) -> Result<BitmapView<'_>, IconError>
    where
        A: AssetSource + ?Sized,
        D: Decoder + ?Sized,
    {
        let index = match self.position(name) {
            Some(index) => {
                self.stats.hits = self.stats.hits.wrapping_add(1);
                index
            }
            None => {
                self.stats.misses = self.stats.misses.wrapping_add(1);
                match self.load(name, now, source, decoder) {
                    Ok(index) => index,
                    Err(e) => {
                        self.stats.failures = self.stats.failures.wrapping_add(1);
                        warn!("Icon {} failed to load: {}", name, e);
                        return Err(e);
                    }
                }
            }
        };

        let icon = self.slots[index].as_mut().ok_or(IconError::NotFound)?;
        icon.last_used = now;
        Ok(icon.bitmap.view())
    }

    fn load<A, D>(&mut self, name: &str, now: u32, source: &mut A, decoder: &mut D) -> Result<usize, IconError>
    where
        A: AssetSource + ?Sized,
        D: Decoder + ?Sized,
    {
        let key: String<MAX_ICON_NAME_LEN> =
            String::try_from(name).map_err(|_| IconError::NotFound)?;
        if key.is_empty() {
            return Err(IconError::NotFound);
        }
        if N == 0 {
            return Err(IconError::OutOfMemory);
        }

        let limit = self.limits.max_source_bytes;
        if self.scratch.len() < limit {
            self.scratch
                .try_reserve_exact(limit - self.scratch.len())
                .map_err(|_| IconError::OutOfMemory)?;
            self.scratch.resize(limit, 0);
        }

        let len = source.read(name, &mut self.scratch[..limit])?;
        let bytes = self.scratch.get(..len).ok_or(IconError::TooLarge)?;

        let (width, height) = decoder.dimensions(bytes)?;
        if width == 0 || height == 0 {
            return Err(IconError::Decode);
        }
        let max = self.limits.max_dimension;
        if width > max || height > max {
            return Err(IconError::TooLarge);
        }

        let mut bitmap = Bitmap::try_new(width, height)?;
        decoder.decode_into(bytes, bitmap.pixels_mut())?;

        let index = self.victim(now);
        if let Some(old) = self.slots[index].take() {
            self.stats.evictions = self.stats.evictions.wrapping_add(1);
            debug!("Evicted icon {} from slot {}", old.name.as_str(), index);
        }
        self.slots[index] = Some(CachedIcon {
            name: key,
            bitmap,
            last_used: now,
        });
        debug!("Cached icon {} ({}x{}) in slot {}", name, width, height, index);
        Ok(index)
    }

    /// First free slot, else the least recently used (lowest index on ties)
    fn victim(&self, now: u32) -> usize {
        if let Some(free) = self.slots.iter().position(|s| s.is_none()) {
            return free;
        }

        let mut oldest: Option<(usize, u32)> = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(icon) = slot {
                let age = now.wrapping_sub(icon.last_used);
                if oldest.map_or(true, |(_, oldest_age)| age > oldest_age) {
                    oldest = Some((i, age));
                }
            }
        }
        oldest.map_or(0, |(i, _)| i)
    }

    /// Drop an icon so the next lookup reloads it
    ///
    /// Returns true if the icon was cached.
    pub fn invalidate(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.slots[index] = None;
                debug!("Invalidated icon {}", name);
                true
            }
            None => false,
        }
    }

    /// Drop every cached icon
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }
}

impl<const N: usize> Default for IconCache<N> {
    fn default() -> Self {
        Self::new(IconSettings::default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Assets named `<w>x<h>` or `<w>x<h>_<tag>`; the asset bytes are the name
    pub(crate) struct NamedAssets {
        pub reads: u32,
    }

    impl AssetSource for NamedAssets {
        fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, AssetError> {
            self.reads += 1;
            if name.starts_with("missing") {
                return Err(AssetError::NotFound);
            }
            if name.starts_with("huge") {
                return Err(AssetError::TooLarge);
            }
            let bytes = name.as_bytes();
            let dst = buf.get_mut(..bytes.len()).ok_or(AssetError::TooLarge)?;
            dst.copy_from_slice(bytes);
            Ok(bytes.len())
        }
    }

    /// Parses `<w>x<h>` from the asset bytes and fills pixels with `w`
    pub(crate) struct SizeDecoder;

    impl SizeDecoder {
        fn parse(bytes: &[u8]) -> Result<(u16, u16), DecodeError> {
            let text = core::str::from_utf8(bytes).map_err(|_| DecodeError::Format)?;
            let dims = text.split('_').next().ok_or(DecodeError::Format)?;
            let (w, h) = dims.split_once('x').ok_or(DecodeError::Format)?;
            let w = w.parse().map_err(|_| DecodeError::Format)?;
            let h = h.parse().map_err(|_| DecodeError::Format)?;
            Ok((w, h))
        }
    }

    impl Decoder for SizeDecoder {
        fn dimensions(&mut self, bytes: &[u8]) -> Result<(u16, u16), DecodeError> {
            Self::parse(bytes)
        }

        fn decode_into(&mut self, bytes: &[u8], out: &mut [u16]) -> Result<(), DecodeError> {
            let (w, h) = Self::parse(bytes)?;
            if out.len() != usize::from(w) * usize::from(h) {
                return Err(DecodeError::BufferSize);
            }
            out.fill(w);
            Ok(())
        }
    }

    fn name(buf: &mut std::string::String, tag: usize) -> &str {
        buf.clear();
        use core::fmt::Write;
        let _ = write!(buf, "4x4_{}", tag);
        buf.as_str()
    }

    fn names_in<const N: usize>(cache: &IconCache<N>) -> std::vec::Vec<std::string::String> {
        cache
            .slots
            .iter()
            .map(|s| s.as_ref().map_or(std::string::String::new(), |i| i.name.as_str().into()))
            .collect()
    }

    #[test]
    fn test_miss_then_hit() {
        let mut cache: IconCache<4> = IconCache::default();
        let mut assets = NamedAssets { reads: 0 };

        let view = cache.get("8x4", 0, &mut assets, &mut SizeDecoder).unwrap();
        assert_eq!((view.width, view.height), (8, 4));
        assert_eq!(view.pixels.len(), 32);
        assert_eq!(view.pixels[0], 8);

        cache.get("8x4", 10, &mut assets, &mut SizeDecoder).unwrap();
        assert_eq!(assets.reads, 1);
        assert_eq!(
            cache.stats(),
            CacheStats { hits: 1, misses: 1, evictions: 0, failures: 0 }
        );
        assert_eq!(cache.resident_bytes(), 64);
    }

    #[test]
    fn test_missing_leaves_slots_unchanged() {
        let mut cache: IconCache<4> = IconCache::default();
        let mut assets = NamedAssets { reads: 0 };
        cache.get("2x2", 0, &mut assets, &mut SizeDecoder).unwrap();
        let before = names_in(&cache);

        assert_eq!(
            cache.get("missing", 5, &mut assets, &mut SizeDecoder),
            Err(IconError::NotFound)
        );
        assert_eq!(names_in(&cache), before);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().failures, 1);
    }

    #[test]
    fn test_failed_load_when_full_evicts_nothing() {
        let mut cache: IconCache<2> = IconCache::default();
        let mut assets = NamedAssets { reads: 0 };
        cache.get("2x2", 0, &mut assets, &mut SizeDecoder).unwrap();
        cache.get("3x3", 1, &mut assets, &mut SizeDecoder).unwrap();
        let before = names_in(&cache);

        assert_eq!(
            cache.get("bogus", 2, &mut assets, &mut SizeDecoder),
            Err(IconError::Decode)
        );
        assert_eq!(
            cache.get("huge", 2, &mut assets, &mut SizeDecoder),
            Err(IconError::TooLarge)
        );
        assert_eq!(names_in(&cache), before);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_dimension_limit() {
        let mut cache: IconCache<2> = IconCache::new(IconSettings {
            max_source_bytes: 64,
            max_dimension: 16,
        });
        let mut assets = NamedAssets { reads: 0 };
        assert!(cache.get("16x16", 0, &mut assets, &mut SizeDecoder).is_ok());
        assert_eq!(
            cache.get("17x2", 0, &mut assets, &mut SizeDecoder),
            Err(IconError::TooLarge)
        );
        assert_eq!(
            cache.get("0x2", 0, &mut assets, &mut SizeDecoder),
            Err(IconError::Decode)
        );
    }

    #[test]
    fn test_source_size_limit() {
        let mut cache: IconCache<2> = IconCache::new(IconSettings {
            max_source_bytes: 4,
            max_dimension: 64,
        });
        let mut assets = NamedAssets { reads: 0 };
        assert!(cache.get("2x2", 0, &mut assets, &mut SizeDecoder).is_ok());
        assert_eq!(
            cache.get("10x10", 0, &mut assets, &mut SizeDecoder),
            Err(IconError::TooLarge)
        );
    }

    #[test]
    fn test_untouched_entry_evicted() {
        let mut cache: IconCache<MAX_ICON_CACHE> = IconCache::default();
        let mut assets = NamedAssets { reads: 0 };
        let mut buf = std::string::String::new();

        for i in 0..MAX_ICON_CACHE {
            cache.get(name(&mut buf, i), 100, &mut assets, &mut SizeDecoder).unwrap();
        }
        // Touch all but #3
        for i in (0..MAX_ICON_CACHE).filter(|&i| i != 3) {
            cache.get(name(&mut buf, i), 200, &mut assets, &mut SizeDecoder).unwrap();
        }

        cache.get("4x4_new", 300, &mut assets, &mut SizeDecoder).unwrap();
        assert!(!cache.contains(name(&mut buf, 3)));
        assert!(cache.contains("4x4_new"));
        assert_eq!(cache.len(), MAX_ICON_CACHE);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_tie_evicts_lowest_slot() {
        let mut cache: IconCache<3> = IconCache::default();
        let mut assets = NamedAssets { reads: 0 };
        cache.get("1x1", 7, &mut assets, &mut SizeDecoder).unwrap();
        cache.get("2x1", 7, &mut assets, &mut SizeDecoder).unwrap();
        cache.get("3x1", 7, &mut assets, &mut SizeDecoder).unwrap();

        cache.get("4x1", 8, &mut assets, &mut SizeDecoder).unwrap();
        assert!(!cache.contains("1x1"));
        assert!(cache.contains("2x1"));
        assert!(cache.contains("3x1"));
    }

    #[test]
    fn test_lru_across_counter_wrap() {
        let mut cache: IconCache<2> = IconCache::default();
        let mut assets = NamedAssets { reads: 0 };
        cache.get("1x1", u32::MAX - 10, &mut assets, &mut SizeDecoder).unwrap();
        cache.get("2x1", 5, &mut assets, &mut SizeDecoder).unwrap();

        // "1x1" is older even though its raw timestamp is larger
        cache.get("3x1", 6, &mut assets, &mut SizeDecoder).unwrap();
        assert!(!cache.contains("1x1"));
        assert!(cache.contains("2x1"));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache: IconCache<4> = IconCache::default();
        let mut assets = NamedAssets { reads: 0 };
        cache.get("2x2", 0, &mut assets, &mut SizeDecoder).unwrap();
        cache.get("3x3", 0, &mut assets, &mut SizeDecoder).unwrap();

        assert!(cache.invalidate("2x2"));
        assert!(!cache.invalidate("2x2"));
        assert!(!cache.contains("2x2"));

        // Reloads on next lookup
        cache.get("2x2", 1, &mut assets, &mut SizeDecoder).unwrap();
        assert_eq!(assets.reads, 3);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.resident_bytes(), 0);
    }

    proptest! {
        #[test]
        fn prop_cache_bounded(requests in proptest::collection::vec((1u16..=8, 1u16..=8), 1..100)) {
            let mut cache: IconCache<4> = IconCache::new(IconSettings {
                max_source_bytes: 32,
                max_dimension: 8,
            });
            let mut assets = NamedAssets { reads: 0 };
            let mut buf = std::string::String::new();

            for (t, (w, h)) in requests.into_iter().enumerate() {
                buf.clear();
                use core::fmt::Write;
                let _ = write!(buf, "{}x{}", w, h);
                let view = cache.get(&buf, t as u32, &mut assets, &mut SizeDecoder).unwrap();
                prop_assert_eq!(view.pixels.len(), usize::from(w) * usize::from(h));

                prop_assert!(cache.len() <= 4);
                prop_assert!(cache.resident_bytes() <= 4 * 8 * 8 * 2);
                let names = names_in(&cache);
                for (i, a) in names.iter().enumerate() {
                    prop_assert!(a.is_empty() || !names[i + 1..].contains(a));
                }
            }
        }
    }
}
