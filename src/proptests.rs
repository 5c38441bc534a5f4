use std::collections::BTreeMap;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

use crate::{Config, Map};

const KEY_SIZE: usize = 3;
const VALUE_SIZE: usize = 2;

/// Fixed-length key drawn from a four-symbol alphabet so runs collide on
/// long shared prefixes and exercise spine growth and contraction.
#[derive(Debug, Clone)]
struct Key(Vec<u8>);

/// Fixed-length value.
#[derive(Debug, Clone)]
struct Value(Vec<u8>);

impl Arbitrary for Key {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::collection::vec(0u8..4, KEY_SIZE).prop_map(Key).boxed()
    }
}

impl Arbitrary for Value {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::collection::vec(any::<u8>(), VALUE_SIZE)
            .prop_map(Value)
            .boxed()
    }
}

/// Actions to test against both implementations
#[derive(Arbitrary, Debug, Clone)]
enum Action {
    Put(Key, Value),
    Replace(Key, Value),
    GetOrPut(Key, Value),
    Get(Key),
    Remove(Key),
    Delete(Key),
}

/// Test harness that executes actions on both the Map and a BTreeMap
/// model
struct Test {
    map: Map,
    model: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Test {
    fn new(config: Config) -> Self {
        Self {
            map: Map::new(config).unwrap(),
            model: BTreeMap::new(),
        }
    }

    fn execute(&mut self, action: Action) {
        match action {
            Action::Put(key, value) => {
                self.map.put(&key.0, &value.0);
                self.model.insert(key.0, value.0);
            }
            Action::Replace(key, value) => {
                let map_result = self.map.replace(&key.0, &value.0);
                let model_result = self.model.insert(key.0.clone(), value.0);
                assert_eq!(
                    map_result, model_result,
                    "Replace mismatch: key={:?}",
                    key.0
                );
            }
            Action::GetOrPut(key, value) => {
                let map_result = self.map.get_or_put(&key.0, &value.0);
                let model_result = self.model.get(&key.0).cloned();
                if model_result.is_none() {
                    self.model.insert(key.0.clone(), value.0);
                }
                assert_eq!(
                    map_result, model_result,
                    "GetOrPut mismatch: key={:?}",
                    key.0
                );
            }
            Action::Get(key) => {
                let map_result = self.map.get(&key.0).map(<[u8]>::to_vec);
                let model_result = self.model.get(&key.0).cloned();
                assert_eq!(map_result, model_result, "Get mismatch: key={:?}", key.0);
            }
            Action::Remove(key) => {
                let map_result = self.map.remove(&key.0);
                let model_result = self.model.remove(&key.0);
                assert_eq!(map_result, model_result, "Remove mismatch: key={:?}", key.0);
            }
            Action::Delete(key) => {
                self.map.delete(&key.0);
                self.model.remove(&key.0);
            }
        }
        // Always verify the live count matches
        assert_eq!(
            self.map.len(),
            self.model.len() as u64,
            "Length mismatch after action"
        );
        assert_eq!(
            self.map.is_empty(),
            self.model.is_empty(),
            "is_empty mismatch"
        );
    }

    fn check_entries(&self) {
        let forward: Vec<_> = self
            .map
            .entries()
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect();
        let expected: Vec<_> = self
            .model
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        assert_eq!(forward, expected, "in-order iteration diverged");

        let mut backward: Vec<_> = self
            .map
            .entries_rev()
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect();
        backward.reverse();
        assert_eq!(backward, expected, "reverse iteration diverged");
    }
}

fn run(config: Config, actions: Vec<Action>) {
    let mut test = Test::new(config);
    for action in actions {
        test.execute(action);
    }
    test.check_entries();
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn proptest_vs_btreemap_binary(actions in prop::collection::vec(any::<Action>(), 1..64)) {
        // One bit per level below a four-way root.
        run(
            Config {
                pointer_size: 2,
                aridity: 2,
                root_aridity: 4,
                key_size: KEY_SIZE,
                value_size: VALUE_SIZE,
            },
            actions,
        );
    }

    #[test]
    fn proptest_vs_btreemap_wide(actions in prop::collection::vec(any::<Action>(), 1..64)) {
        // Nibble steps below a byte-wide root, five-byte pointers.
        run(
            Config {
                pointer_size: 5,
                aridity: 16,
                root_aridity: 256,
                key_size: KEY_SIZE,
                value_size: VALUE_SIZE,
            },
            actions,
        );
    }
}
