//! Stress tests for nkdb.
//!
//! These helpers drive one database from several threads and report
//! what happened, so tests can check for lost updates and torn reads.

use nkdb_core::{CoreResult, Database};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        Self {
            total_ops: successful + failed,
            successful_ops: successful,
            failed_ops: failed,
            duration,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 50,
            threads: 4,
        }
    }
}

/// Increments the counter record `key` from many threads using `update`.
///
/// The record is `[key, count]` with the key in field 0. With exclusive
/// writable transactions no increment may be lost, so the final count
/// equals `successful_ops`.
pub fn stress_counter_increments(
    db: Arc<Database>,
    key: &str,
    config: &StressConfig,
) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let db = Arc::clone(&db);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let key = key.to_string();
            let operations = config.operations;

            thread::spawn(move || {
                for _ in 0..operations {
                    match increment(&db, &key) {
                        Ok(()) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("stress thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Reads the counter value stored by [`stress_counter_increments`].
pub fn read_counter(db: &Database, key: &str) -> CoreResult<u64> {
    let record = db.get(key)?;
    Ok(record.get(1).and_then(|v| v.parse().ok()).unwrap_or(0))
}

fn increment(db: &Database, key: &str) -> CoreResult<()> {
    db.update(|tx| {
        let current = match tx.get(key) {
            Ok(record) => record
                .get(1)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0),
            Err(e) if e.is_not_exist() => 0,
            Err(e) => return Err(e),
        };
        tx.set(key, vec![key.to_string(), (current + 1).to_string()])
    })
}

/// Result of a snapshot consistency run.
#[derive(Debug, Clone)]
pub struct SnapshotStressResult {
    /// Read snapshots whose records disagreed on the generation.
    pub torn_reads: usize,
    /// Operations counted by outcome.
    pub ops: StressTestResult,
}

/// Runs readers and writers concurrently and checks every read snapshot.
///
/// Writers rewrite all `width` records `k0..kN` to the same generation
/// number in one transaction. Readers check, inside a `view`, that every
/// record shows the same generation. Failed `update` and `view` calls are
/// counted in `ops.failed_ops`; a clean run has no torn reads and no
/// failures.
pub fn stress_snapshot_consistency(
    db: Arc<Database>,
    width: usize,
    config: &StressConfig,
) -> SnapshotStressResult {
    let torn = Arc::new(AtomicUsize::new(0));
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let generation = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let writers = (0..config.threads).map(|_| {
        let db = Arc::clone(&db);
        let generation = Arc::clone(&generation);
        let successful = Arc::clone(&successful);
        let failed = Arc::clone(&failed);
        let operations = config.operations;
        thread::spawn(move || {
            for _ in 0..operations {
                let value = generation.fetch_add(1, Ordering::SeqCst).to_string();
                let outcome = db.update(|tx| {
                    for i in 0..width {
                        let key = format!("k{i}");
                        tx.set(&key, vec![key.clone(), value.clone()])?;
                    }
                    Ok(())
                });
                match outcome {
                    Ok(()) => successful.fetch_add(1, Ordering::Relaxed),
                    Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                };
            }
        })
    });

    let readers = (0..config.threads).map(|_| {
        let db = Arc::clone(&db);
        let torn = Arc::clone(&torn);
        let successful = Arc::clone(&successful);
        let failed = Arc::clone(&failed);
        let operations = config.operations;
        thread::spawn(move || {
            for _ in 0..operations {
                let outcome = db.view(|tx| {
                    let mut values = Vec::with_capacity(tx.len());
                    for key in tx.keys() {
                        let record = tx.get(&key)?;
                        values.push(record.get(1).cloned().unwrap_or_default());
                    }
                    if values.windows(2).any(|w| w[0] != w[1]) {
                        torn.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok(())
                });
                match outcome {
                    Ok(()) => successful.fetch_add(1, Ordering::Relaxed),
                    Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                };
            }
        })
    });

    let handles: Vec<_> = writers.chain(readers).collect();
    for handle in handles {
        handle.join().expect("stress thread panicked");
    }

    SnapshotStressResult {
        torn_reads: torn.load(Ordering::SeqCst),
        ops: StressTestResult::new(
            successful.load(Ordering::Relaxed),
            failed.load(Ordering::Relaxed),
            start.elapsed(),
        ),
    }
}
