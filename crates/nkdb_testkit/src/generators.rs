//! Property-based test generators using proptest.
//!
//! Provides strategies for keys and records that satisfy the key-field
//! invariant of a database.

use nkdb_storage::Record;
use proptest::prelude::*;

/// Strategy for generating keys.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_-]{1,16}").expect("Invalid regex")
}

/// Strategy for generating field values, including CSV-hostile characters.
pub fn field_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,24}").expect("Invalid regex")
}

/// Strategy for a well-formed record carrying `key` at `key_field`.
pub fn record_with_key(key: String, key_field: usize) -> impl Strategy<Value = Record> {
    let fields = prop::collection::vec(field_strategy(), key_field + 1..key_field + 5);
    fields.prop_map(move |mut fields| {
        fields[key_field] = key.clone();
        fields
    })
}

/// Strategy for a key and a matching well-formed record.
pub fn keyed_record_strategy(key_field: usize) -> impl Strategy<Value = (String, Record)> {
    key_strategy().prop_flat_map(move |key| {
        record_with_key(key.clone(), key_field)
            .prop_map(move |record| (key.clone(), record))
    })
}

/// Strategy for a list of records with distinct keys at `key_field`.
pub fn unique_dataset_strategy(
    key_field: usize,
    max_len: usize,
) -> impl Strategy<Value = Vec<Record>> {
    let keys = prop::collection::hash_set(key_strategy(), 0..max_len);
    keys.prop_flat_map(move |keys| {
        keys.into_iter()
            .map(|key| record_with_key(key, key_field))
            .collect::<Vec<_>>()
    })
}

/// Single operation for model-based tests.
#[derive(Debug, Clone)]
pub enum Op {
    /// `set(key, record)`.
    Set(String, Record),
    /// `delete(key)`.
    Delete(String),
}

/// Strategy for a sequence of operations over a small key space.
///
/// Keys are drawn from a handful of values so sets and deletes collide.
pub fn op_sequence_strategy(key_field: usize, len: usize) -> impl Strategy<Value = Vec<Op>> {
    let key = prop::sample::select(vec!["a", "b", "c", "d"])
        .prop_map(str::to_string);
    let op = (key, any::<bool>()).prop_flat_map(move |(key, is_set)| {
        if is_set {
            record_with_key(key.clone(), key_field)
                .prop_map(move |record| Op::Set(key.clone(), record))
                .boxed()
        } else {
            Just(Op::Delete(key)).boxed()
        }
    });
    prop::collection::vec(op, 0..len)
}
