//! Time-bounded caching backend wrapper.
//!
//! [`CachedBackend`] wraps any other backend and keeps the last dataset it
//! saw in memory. Loads are answered from that snapshot while it is younger
//! than the configured time-to-live.
//!
//! ## Snapshot Rules
//!
//! - A successful `load` from the inner backend replaces the snapshot
//! - A failed `load` leaves the previous snapshot (and its age) untouched
//! - A successful `save` adopts the saved dataset as the snapshot
//! - A failed `save` drops the snapshot so the next `load` goes to the inner backend

use crate::backend::{Dataset, Record, StorageBackend};
use crate::error::StorageResult;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

#[derive(Debug)]
struct Snapshot {
    records: Dataset,
    taken_at: Instant,
}

impl Snapshot {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.taken_at.elapsed() < ttl
    }
}

/// A storage backend that caches another backend's dataset for a fixed TTL.
///
/// The snapshot is guarded by its own mutex, so concurrent readers holding a
/// shared database lock can refresh it safely. A refresh holds that mutex for
/// the duration of the inner `load`, which collapses simultaneous misses into
/// one inner read.
///
/// # Example
///
/// ```rust
/// use nkdb_storage::{CachedBackend, InMemoryBackend, StorageBackend};
/// use std::time::Duration;
///
/// let cached = CachedBackend::new(InMemoryBackend::new(), Duration::from_secs(1));
/// cached.save(&[vec!["a".to_string()]]).unwrap();
/// assert_eq!(cached.load().unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct CachedBackend<B> {
    inner: B,
    ttl: Duration,
    snapshot: Mutex<Option<Snapshot>>,
}

impl<B: StorageBackend> CachedBackend<B> {
    /// Creates a cache in front of `inner` whose snapshots expire after `ttl`.
    ///
    /// A zero `ttl` disables caching; every load goes to the inner backend.
    pub fn new(inner: B, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            snapshot: Mutex::new(None),
        }
    }

    /// Returns the configured time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the wrapped backend.
    #[must_use]
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Returns true if a snapshot is held and still fresh.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.snapshot
            .lock()
            .as_ref()
            .is_some_and(|s| s.is_fresh(self.ttl))
    }

    /// Drops the snapshot, forcing the next load to read the inner backend.
    pub fn invalidate(&self) {
        self.snapshot.lock().take();
    }

    /// Consumes the cache and returns the wrapped backend.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: StorageBackend> StorageBackend for CachedBackend<B> {
    fn load(&self) -> StorageResult<Dataset> {
        let mut snapshot = self.snapshot.lock();

        if let Some(current) = snapshot.as_ref() {
            if current.is_fresh(self.ttl) {
                trace!(records = current.records.len(), "cache hit");
                return Ok(current.records.clone());
            }
        }

        let records = self.inner.load()?;
        debug!(records = records.len(), "cache refreshed");
        *snapshot = Some(Snapshot {
            records: records.clone(),
            taken_at: Instant::now(),
        });

        Ok(records)
    }

    fn save(&self, records: &[Record]) -> StorageResult<()> {
        let mut snapshot = self.snapshot.lock();

        if let Err(e) = self.inner.save(records) {
            debug!(error = %e, "save failed, cache invalidated");
            *snapshot = None;
            return Err(e);
        }

        *snapshot = Some(Snapshot {
            records: records.to_vec(),
            taken_at: Instant::now(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::memory::InMemoryBackend;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;

    /// Counts inner calls and fails on demand.
    #[derive(Default)]
    struct Probe {
        store: InMemoryBackend,
        loads: AtomicUsize,
        saves: AtomicUsize,
        fail_load: AtomicBool,
        fail_save: AtomicBool,
    }

    impl StorageBackend for &Probe {
        fn load(&self) -> StorageResult<Dataset> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(StorageError::unavailable("load refused"));
            }
            self.store.load()
        }

        fn save(&self, records: &[Record]) -> StorageResult<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail_save.load(Ordering::SeqCst) {
                return Err(StorageError::unavailable("save refused"));
            }
            self.store.save(records)
        }
    }

    fn record(fields: &[&str]) -> Record {
        fields.iter().map(|f| (*f).to_string()).collect()
    }

    const TTL: Duration = Duration::from_millis(100);

    #[test]
    fn cached_loads_within_ttl_hit_once() {
        let probe = Probe::default();
        probe.store.save(&[record(&["a", "1"])]).unwrap();
        let cached = CachedBackend::new(&probe, TTL);

        let first = cached.load().unwrap();
        let second = cached.load().unwrap();

        assert_eq!(first, second);
        assert_eq!(probe.loads.load(Ordering::SeqCst), 1);
        assert!(cached.is_fresh());
    }

    #[test]
    fn cached_expired_snapshot_reloads() {
        let probe = Probe::default();
        let cached = CachedBackend::new(&probe, TTL);

        cached.load().unwrap();
        thread::sleep(TTL + Duration::from_millis(20));
        assert!(!cached.is_fresh());
        cached.load().unwrap();

        assert_eq!(probe.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cached_zero_ttl_never_hits() {
        let probe = Probe::default();
        let cached = CachedBackend::new(&probe, Duration::ZERO);

        cached.load().unwrap();
        cached.load().unwrap();

        assert_eq!(probe.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cached_save_adopts_records() {
        let probe = Probe::default();
        let cached = CachedBackend::new(&probe, TTL);

        cached.save(&[record(&["b", "2"])]).unwrap();
        let loaded = cached.load().unwrap();

        assert_eq!(loaded, vec![record(&["b", "2"])]);
        assert_eq!(probe.loads.load(Ordering::SeqCst), 0);
        assert_eq!(probe.saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cached_failed_save_invalidates() {
        let probe = Probe::default();
        probe.store.save(&[record(&["a", "1"])]).unwrap();
        let cached = CachedBackend::new(&probe, TTL);
        cached.load().unwrap();

        probe.fail_save.store(true, Ordering::SeqCst);
        assert!(cached.save(&[record(&["rejected"])]).is_err());
        assert!(!cached.is_fresh());

        let loaded = cached.load().unwrap();
        assert_eq!(loaded, vec![record(&["a", "1"])]);
        assert_eq!(probe.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cached_fresh_snapshot_masks_inner_failure() {
        let probe = Probe::default();
        probe.store.save(&[record(&["a", "1"])]).unwrap();
        let cached = CachedBackend::new(&probe, Duration::from_secs(60));
        cached.load().unwrap();

        // Snapshot is fresh; the failing inner load is never reached.
        probe.fail_load.store(true, Ordering::SeqCst);
        assert_eq!(cached.load().unwrap(), vec![record(&["a", "1"])]);
        assert_eq!(probe.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cached_failed_refresh_propagates_and_keeps_stale_snapshot() {
        let probe = Probe::default();
        let cached = CachedBackend::new(&probe, TTL);
        cached.save(&[record(&["a", "1"])]).unwrap();

        thread::sleep(TTL + Duration::from_millis(20));
        probe.fail_load.store(true, Ordering::SeqCst);
        assert!(cached.load().is_err());
        assert!(cached.snapshot.lock().is_some());

        probe.fail_load.store(false, Ordering::SeqCst);
        assert_eq!(cached.load().unwrap(), vec![record(&["a", "1"])]);
    }

    #[test]
    fn cached_invalidate_forces_reload() {
        let probe = Probe::default();
        let cached = CachedBackend::new(&probe, Duration::from_secs(60));

        cached.load().unwrap();
        cached.invalidate();
        cached.load().unwrap();

        assert_eq!(probe.loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cached_into_inner() {
        let cached = CachedBackend::new(InMemoryBackend::new(), TTL);
        cached.save(&[record(&["x"])]).unwrap();
        assert_eq!(cached.into_inner().records(), vec![record(&["x"])]);
    }
}
