//! Property-Based Tests for the Cache Module
//!
//! Uses proptest to check the store against a plain `HashMap` model.

use proptest::prelude::*;
use serde_json::Number;
use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{Clock, KvStore, ManualClock};
use crate::error::KvError;
use crate::storage::SqliteStore;
use crate::value::Value;

// == Test Configuration ==
const START: f64 = 1_700_000_000.0;

// == Strategies ==
/// Generates valid keys (non-empty)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-d]{1,2}"
}

fn leaf_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e12f64..1.0e12).prop_map(|f| Value::Number(Number::from_f64(f).unwrap())),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
    ]
}

/// Generates arbitrary values, nested lists and maps included
fn value_strategy() -> impl Strategy<Value = Value> {
    leaf_value_strategy().prop_recursive(3, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(prop::option::of(inner.clone()), 0..5).prop_map(Value::List),
            prop::collection::btree_map("[a-z]{1,6}", prop::option::of(inner), 0..5)
                .prop_map(Value::Map),
        ]
    })
}

#[derive(Debug, Clone)]
enum StoreOp {
    Set {
        key: String,
        value: Value,
        ttl: Option<u8>,
    },
    Get {
        key: String,
    },
    Delete {
        key: String,
    },
    DeleteAll,
    Advance {
        seconds: u8,
    },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        4 => (valid_key_strategy(), leaf_value_strategy(), prop::option::of(1u8..5))
            .prop_map(|(key, value, ttl)| StoreOp::Set { key, value, ttl }),
        3 => valid_key_strategy().prop_map(|key| StoreOp::Get { key }),
        2 => valid_key_strategy().prop_map(|key| StoreOp::Delete { key }),
        1 => Just(StoreOp::DeleteAll),
        2 => (0u8..4).prop_map(|seconds| StoreOp::Advance { seconds }),
    ]
}

fn test_store() -> (KvStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START));
    let store = KvStore::with_clock(SqliteStore::in_memory(), clock.clone());
    store.initialize().unwrap();
    (store, clock)
}

/// Model entry: value and optional expiry instant
type Model = HashMap<String, (Value, Option<f64>)>;

fn model_live(model: &Model, key: &str, now: f64) -> Option<Value> {
    model
        .get(key)
        .filter(|(_, expires)| !matches!(expires, Some(at) if *at <= now))
        .map(|(value, _)| value.clone())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Any value written can be read back unchanged, before and after the
    // cache is rebuilt from the durable store.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in value_strategy()) {
        let (store, _) = test_store();

        store.set(&key, value.clone(), None).unwrap();
        prop_assert_eq!(&store.get(&key).unwrap().value, &value);

        store.initialize().unwrap();
        prop_assert_eq!(&store.get(&key).unwrap().value, &value);
    }

    // Writing V1 then V2 under the same key leaves only V2.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let (store, _) = test_store();

        store.set(&key, value1, None).unwrap();
        store.set(&key, value2.clone(), None).unwrap();

        prop_assert_eq!(store.get(&key).unwrap().value, value2);
        prop_assert_eq!(store.len(), 1);
    }

    // Every observable result matches the model, and after any sequence the
    // durable store holds exactly the live entries of the model.
    #[test]
    fn prop_operations_match_model(ops in prop::collection::vec(store_op_strategy(), 1..40)) {
        let (store, clock) = test_store();
        let mut model = Model::new();

        for op in ops {
            let now = clock.now();
            match op {
                StoreOp::Set { key, value, ttl } => {
                    let ttl = ttl.map(f64::from);
                    store.set(&key, value.clone(), ttl).unwrap();
                    model.insert(key, (value, ttl.map(|t| now + t)));
                }
                StoreOp::Get { key } => {
                    match (store.get(&key), model_live(&model, &key, now)) {
                        (Ok(entry), Some(expected)) => prop_assert_eq!(entry.value, expected),
                        (Err(KvError::NotFound(_)), None) => {}
                        (actual, expected) => {
                            prop_assert!(false, "get({}) = {:?}, model = {:?}", key, actual, expected);
                        }
                    }
                }
                StoreOp::Delete { key } => {
                    let expected = model_live(&model, &key, now).is_some();
                    prop_assert_eq!(store.delete(&key).unwrap(), expected);
                    model.remove(&key);
                }
                StoreOp::DeleteAll => {
                    let expected = model
                        .keys()
                        .filter(|key| model_live(&model, key, now).is_some())
                        .count();
                    prop_assert_eq!(store.delete_all().unwrap(), expected);
                    model.clear();
                }
                StoreOp::Advance { seconds } => clock.advance(f64::from(seconds)),
            }
        }

        let now = clock.now();
        store.initialize().unwrap();
        let listing = store.list_all().unwrap();
        let expected: HashMap<String, Value> = model
            .keys()
            .filter_map(|key| model_live(&model, key, now).map(|v| (key.clone(), v)))
            .collect();

        prop_assert_eq!(listing.len(), expected.len());
        for (key, value) in expected {
            prop_assert_eq!(&listing[&key].value, &value);
        }
    }
}
