//! Property tests against a simple model of the dataset.

use nkdb_core::Database;
use nkdb_storage::Record;
use nkdb_testkit::{
    keyed_record_strategy, op_sequence_strategy, unique_dataset_strategy, FaultyBackend, Op,
    TestDatabase,
};
use proptest::prelude::*;

const KEY_FIELD: usize = 1;

fn apply_model(model: &mut Vec<Record>, op: &Op) {
    match op {
        Op::Set(key, record) => match model.iter().position(|r| &r[KEY_FIELD] == key) {
            Some(pos) => model[pos] = record.clone(),
            None => model.push(record.clone()),
        },
        Op::Delete(key) => {
            if let Some(pos) = model.iter().position(|r| &r[KEY_FIELD] == key) {
                model.remove(pos);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn single_shot_ops_match_model(ops in op_sequence_strategy(KEY_FIELD, 30)) {
        let backend = FaultyBackend::new();
        let db = Database::new(KEY_FIELD, std::sync::Arc::clone(&backend));
        let mut model = Vec::new();

        for op in &ops {
            match op {
                Op::Set(key, record) => db.set(key, record.clone()).unwrap(),
                Op::Delete(key) => db.delete(key).unwrap(),
            }
            apply_model(&mut model, op);
        }

        prop_assert_eq!(backend.persisted(), model);
    }

    #[test]
    fn transactional_ops_match_model(ops in op_sequence_strategy(KEY_FIELD, 30)) {
        let backend = FaultyBackend::new();
        let db = Database::new(KEY_FIELD, std::sync::Arc::clone(&backend));
        let mut model = Vec::new();

        db.update(|tx| {
            for op in &ops {
                match op {
                    Op::Set(key, record) => tx.set(key, record.clone())?,
                    Op::Delete(key) => {
                        if tx.contains(key) {
                            tx.delete(key)?;
                        } else {
                            assert!(tx.delete(key).unwrap_err().is_not_exist());
                        }
                    }
                }
            }
            Ok(())
        })
        .unwrap();

        // Deleting then re-setting a key moves it to the end, the same as
        // the single-shot model.
        for op in &ops {
            apply_model(&mut model, op);
        }
        prop_assert_eq!(backend.persisted(), model);
    }

    #[test]
    fn csv_database_round_trips((key, record) in keyed_record_strategy(KEY_FIELD)) {
        let config = nkdb_core::Config::new().key_field(KEY_FIELD);
        let test_db = TestDatabase::file_with_config(config.clone());

        test_db.set(&key, record.clone()).unwrap();

        let reopened = Database::open(&test_db.path().unwrap(), config);
        prop_assert_eq!(reopened.get(&key).unwrap(), record);
    }

    #[test]
    fn view_sees_loaded_dataset(records in unique_dataset_strategy(KEY_FIELD, 12)) {
        let backend = FaultyBackend::with_records(records.clone());
        let db = Database::new(KEY_FIELD, backend);

        let keys = db.view(|tx| Ok(tx.keys())).unwrap();
        let expected: Vec<String> = records.iter().map(|r| r[KEY_FIELD].clone()).collect();
        prop_assert_eq!(keys, expected);
    }
}
