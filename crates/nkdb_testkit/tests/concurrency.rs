//! Lock discipline across threads.

use nkdb_core::{CoreResult, Database};
use nkdb_testkit::{
    read_counter, record, stress_counter_increments, stress_snapshot_consistency, FaultyBackend,
    StressConfig,
};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const BLOCKED: Duration = Duration::from_millis(100);
const GENEROUS: Duration = Duration::from_secs(5);

#[test]
fn writable_transaction_blocks_single_shot_reads() {
    let db = Arc::new(Database::open_in_memory(0));
    let tx = db.begin(true).unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let reader = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            let keys = db.keys();
            done_tx.send(()).unwrap();
            keys
        })
    };

    assert!(
        done_rx.recv_timeout(BLOCKED).is_err(),
        "reader ran during writable transaction"
    );

    tx.rollback();
    done_rx.recv_timeout(GENEROUS).unwrap();
    assert!(reader.join().unwrap().unwrap().is_empty());
}

#[test]
fn writable_transaction_blocks_other_begins() {
    let db = Arc::new(Database::open_in_memory(0));
    let mut tx = db.begin(true).unwrap();
    tx.set("a", record(&["a", "1"])).unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let other = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            let seen = db.view(|tx| Ok(tx.keys()));
            done_tx.send(()).unwrap();
            seen
        })
    };

    assert!(done_rx.recv_timeout(BLOCKED).is_err());

    // Commit alone does not release the lock.
    tx.commit().unwrap();
    assert!(done_rx.recv_timeout(BLOCKED).is_err());

    tx.rollback();
    done_rx.recv_timeout(GENEROUS).unwrap();
    assert_eq!(other.join().unwrap().unwrap(), vec!["a".to_string()]);
}

#[test]
fn read_only_transaction_keeps_its_snapshot() {
    let db = Arc::new(Database::open_in_memory(0));
    db.set("a", record(&["a", "1"])).unwrap();

    let reader = db.begin(false).unwrap();

    let writer = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            db.update(|tx| {
                tx.set("a", record(&["a", "2"]))?;
                tx.set("b", record(&["b", "3"]))
            })
        })
    };

    thread::sleep(BLOCKED);
    assert_eq!(reader.get("a").unwrap(), record(&["a", "1"]));
    assert_eq!(reader.keys(), vec!["a".to_string()]);
    assert!(reader.get("b").unwrap_err().is_not_exist());
    reader.rollback();

    writer.join().unwrap().unwrap();
    assert_eq!(db.get("a").unwrap(), record(&["a", "2"]));
    assert_eq!(db.keys().unwrap(), vec!["a", "b"]);
}

#[test]
fn panicking_update_releases_lock_without_commit() {
    let db = Arc::new(Database::open_in_memory(0));

    let outcome = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            db.update(|tx| -> CoreResult<()> {
                tx.set("x", record(&["x", "9"]))?;
                panic!("update closure failed")
            })
        })
        .join()
    };
    assert!(outcome.is_err());

    let tx = db.try_begin_for(true, GENEROUS).unwrap();
    assert!(tx.get("x").unwrap_err().is_not_exist());
    tx.rollback();
}

#[test]
fn concurrent_increments_are_not_lost() {
    let db = Arc::new(Database::open_in_memory(0));
    let config = StressConfig {
        operations: 25,
        threads: 4,
    };

    let result = stress_counter_increments(Arc::clone(&db), "counter", &config);

    assert_eq!(result.failed_ops, 0);
    assert_eq!(result.total_ops, 100);
    assert_eq!(read_counter(&db, "counter").unwrap(), 100);
}

#[test]
fn readers_never_observe_partial_commits() {
    let db = Arc::new(Database::open_in_memory(0));
    let config = StressConfig::default();

    let result = stress_snapshot_consistency(db, 8, &config);

    assert_eq!(result.torn_reads, 0);
    assert_eq!(result.ops.failed_ops, 0);
    assert_eq!(result.ops.total_ops, 2 * config.threads * config.operations);
}

#[test]
fn snapshot_stress_counts_failed_operations() {
    let backend = FaultyBackend::new();
    backend.fail_loads(true);
    let db = Arc::new(Database::new(0, Arc::clone(&backend)));
    let config = StressConfig {
        operations: 5,
        threads: 2,
    };

    let result = stress_snapshot_consistency(db, 4, &config);

    assert_eq!(result.torn_reads, 0);
    assert_eq!(result.ops.successful_ops, 0);
    assert_eq!(result.ops.failed_ops, 20);
}
