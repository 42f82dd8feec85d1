//! App snapshot persistence
//!
//! User apps are saved as a postcard-encoded list of [`AppRecord`]s under
//! [`StorageKey::Apps`]. System apps are recreated from settings at boot and
//! are never written.

use heapless::Vec;

use crate::config::{MAX_APPS, MAX_ICON_NAME_LEN, MAX_ID_LEN, MAX_TEXT_LEN};
use crate::registry::AppRecord;
use crate::scheduler::Scheduler;
use crate::traits::{SnapshotStore, StorageKey, StoreError};

/// Worst-case encoded size of one record
///
/// Three length-prefixed strings, four varint `u32`s, one `i8`, one `bool`.
pub const MAX_RECORD_BYTES: usize =
    (1 + MAX_ID_LEN) + (1 + MAX_TEXT_LEN) + (1 + MAX_ICON_NAME_LEN) + 4 * 5 + 1 + 1;

/// Buffer size that fits a full registry
pub const SNAPSHOT_BUF_LEN: usize = 1 + MAX_APPS * MAX_RECORD_BYTES;

/// Errors from saving or restoring a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Storage backend failed
    Store(StoreError),
    /// Buffer too small to encode the snapshot
    Encode,
    /// Stored data is not a valid snapshot
    Decode,
}

impl From<StoreError> for PersistError {
    fn from(e: StoreError) -> Self {
        PersistError::Store(e)
    }
}

/// Collect the records of all user apps in slot order
pub fn snapshot<const N: usize>(scheduler: &Scheduler<N>) -> Vec<AppRecord, N> {
    scheduler
        .registry()
        .iter()
        .filter(|(_, item)| !item.is_system)
        .map(|(_, item)| item.to_record())
        .collect()
}

/// Encode user apps into `buf`, returning the encoded length
pub fn encode<const N: usize>(scheduler: &Scheduler<N>, buf: &mut [u8]) -> Result<usize, PersistError> {
    let records = snapshot(scheduler);
    postcard::to_slice(&records, buf)
        .map(|used| used.len())
        .map_err(|_| PersistError::Encode)
}

/// Decode a snapshot
pub fn decode<const N: usize>(bytes: &[u8]) -> Result<Vec<AppRecord, N>, PersistError> {
    postcard::from_bytes(bytes).map_err(|_| PersistError::Decode)
}

/// Encode user apps and write them to the store
pub fn save<S, const N: usize>(
    scheduler: &Scheduler<N>,
    store: &mut S,
    buf: &mut [u8],
) -> Result<usize, PersistError>
where
    S: SnapshotStore + ?Sized,
{
    let len = encode(scheduler, buf)?;
    store.write(StorageKey::Apps, &buf[..len])?;
    debug!("Saved {} bytes of apps", len);
    Ok(len)
}

/// Read the stored snapshot and replay it through `add_or_update`
///
/// Call once at boot, after seeding system apps. A missing snapshot is not
/// an error. Records the registry rejects are skipped. Returns the number
/// of apps restored.
pub fn restore<S, const N: usize>(
    store: &mut S,
    scheduler: &mut Scheduler<N>,
    buf: &mut [u8],
    now: u32,
) -> Result<usize, PersistError>
where
    S: SnapshotStore + ?Sized,
{
    let len = match store.read(StorageKey::Apps, buf) {
        Ok(len) => len,
        Err(StoreError::NotFound) => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    let bytes = buf.get(..len).ok_or(PersistError::Decode)?;
    let records: Vec<AppRecord, MAX_APPS> = decode(bytes)?;

    let mut restored = 0;
    for record in records.iter().filter(|r| !r.is_system) {
        match scheduler.add_or_update(record, now) {
            Ok(_) => restored += 1,
            Err(e) => warn!("Skipping stored app {}: {}", record.id.as_str(), e),
        }
    }
    info!("Restored {} apps", restored);
    Ok(restored)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Color;
    use std::collections::BTreeMap;

    #[derive(Default)]
    pub(crate) struct MemStore {
        blobs: BTreeMap<u8, std::vec::Vec<u8>>,
        fail: bool,
    }

    impl SnapshotStore for MemStore {
        fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StoreError> {
            if self.fail {
                return Err(StoreError::Device);
            }
            let blob = self.blobs.get(&key.as_u8()).ok_or(StoreError::NotFound)?;
            let dst = buffer
                .get_mut(..blob.len())
                .ok_or(StoreError::BufferTooSmall)?;
            dst.copy_from_slice(blob);
            Ok(blob.len())
        }

        fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Device);
            }
            self.blobs.insert(key.as_u8(), data.to_vec());
            Ok(())
        }
    }

    fn populated() -> Scheduler<8> {
        let mut sched = Scheduler::new(1000);
        sched
            .add_or_update(&AppRecord::system("clock").unwrap(), 0)
            .unwrap();
        sched
            .add_or_update(
                &AppRecord::new("weather")
                    .unwrap()
                    .with_text("21°C")
                    .with_icon("w_rain")
                    .with_colors(Color(0x00FF00), Color(0x000010))
                    .with_duration(5000)
                    .with_lifetime(60_000)
                    .with_priority(-3),
                0,
            )
            .unwrap();
        sched
            .add_or_update(&AppRecord::new("note").unwrap().with_text("hello"), 0)
            .unwrap();
        sched
    }

    #[test]
    fn test_save_and_restore() {
        let source = populated();
        let mut store = MemStore::default();
        let mut buf = [0u8; SNAPSHOT_BUF_LEN];
        save(&source, &mut store, &mut buf).unwrap();

        let mut target: Scheduler<8> = Scheduler::new(1000);
        target
            .add_or_update(&AppRecord::system("clock").unwrap(), 0)
            .unwrap();
        let restored = restore(&mut store, &mut target, &mut buf, 500).unwrap();
        assert_eq!(restored, 2);
        assert_eq!(target.status().count, 3);

        let weather = target.registry().get_by_id("weather").unwrap();
        assert_eq!(weather.text.as_str(), "21°C");
        assert_eq!(weather.icon.as_str(), "w_rain");
        assert_eq!(weather.duration_ms, 5000);
        assert_eq!(weather.priority, -3);
        // Lifetime restarts at restore time
        assert_eq!(weather.created_at, 500);
    }

    #[test]
    fn test_system_apps_not_saved() {
        let records = snapshot(&populated());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.is_system));
    }

    #[test]
    fn test_full_registry_fits_buffer() {
        let mut sched: Scheduler<MAX_APPS> = Scheduler::new(1000);
        let text = "x".repeat(MAX_TEXT_LEN);
        let icon = "i".repeat(MAX_ICON_NAME_LEN);
        for i in 0..MAX_APPS {
            let id = std::format!("{:0>24}", i);
            let record = AppRecord::new(&id)
                .unwrap()
                .with_text(&text)
                .with_icon(&icon)
                .with_colors(Color(0xFFFFFF), Color(0xFFFFFF))
                .with_duration(u32::MAX)
                .with_lifetime(u32::MAX)
                .with_priority(-10);
            sched.add_or_update(&record, 0).unwrap();
        }

        let mut buf = [0u8; SNAPSHOT_BUF_LEN];
        assert!(encode(&sched, &mut buf).is_ok());
    }

    #[test]
    fn test_missing_snapshot() {
        let mut store = MemStore::default();
        let mut sched: Scheduler<8> = Scheduler::new(1000);
        let mut buf = [0u8; 64];
        assert_eq!(restore(&mut store, &mut sched, &mut buf, 0), Ok(0));
    }

    #[test]
    fn test_errors() {
        let mut store = MemStore {
            fail: true,
            ..Default::default()
        };
        let mut buf = [0u8; SNAPSHOT_BUF_LEN];
        assert_eq!(
            save(&populated(), &mut store, &mut buf),
            Err(PersistError::Store(StoreError::Device))
        );

        let mut tiny = [0u8; 4];
        assert_eq!(encode(&populated(), &mut tiny), Err(PersistError::Encode));

        let mut store = MemStore::default();
        store.write(StorageKey::Apps, &[0xFF, 0xFF, 0xFF]).unwrap();
        let mut sched: Scheduler<8> = Scheduler::new(1000);
        assert_eq!(
            restore(&mut store, &mut sched, &mut buf, 0),
            Err(PersistError::Decode)
        );
    }

    #[test]
    fn test_rejected_records_skipped() {
        let mut store = MemStore::default();
        let mut buf = [0u8; SNAPSHOT_BUF_LEN];
        save(&populated(), &mut store, &mut buf).unwrap();

        // Room for only one of the two stored apps
        let mut small: Scheduler<1> = Scheduler::new(1000);
        let restored = restore(&mut store, &mut small, &mut buf, 0).unwrap();
        assert_eq!(restored, 1);
        assert!(small.registry().find("weather").is_some());
    }
}
