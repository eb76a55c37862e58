use oz_core::collections::{HashIndex, HashString};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Operation<K> {
    Add(K, u16),
    Include(K, u16),
    Exclude(K),
    Find(K),
}

fn operations<K: Strategy + 'static>(keys: K) -> impl Strategy<Value = Vec<Operation<K::Value>>> {
    let keys = keys.boxed();
    proptest::collection::vec(
        prop_oneof![
            (keys.clone(), any::<u16>()).prop_map(|(k, v)| Operation::Add(k, v)),
            (keys.clone(), any::<u16>()).prop_map(|(k, v)| Operation::Include(k, v)),
            keys.clone().prop_map(Operation::Exclude),
            keys.prop_map(Operation::Find),
        ],
        1..200,
    )
}

proptest! {
    #[test]
    fn test_hash_index_matches_std_map(ops in operations(-64i32..64)) {
        let mut std_map = HashMap::new();
        let mut index: HashIndex<u16, 31> = HashIndex::new();

        for op in ops {
            match op {
                Operation::Add(k, v) => {
                    std_map.insert(k, v);
                    index.add(k, v);
                }
                Operation::Include(k, v) => {
                    let expected = *std_map.entry(k).or_insert(v);
                    prop_assert_eq!(*index.include(k, v), expected);
                }
                Operation::Exclude(k) => {
                    prop_assert_eq!(index.exclude(k), std_map.remove(&k).is_some());
                }
                Operation::Find(k) => {
                    prop_assert_eq!(index.find(k), std_map.get(&k));
                }
            }
        }

        prop_assert_eq!(index.len(), std_map.len());
        for (k, v) in &std_map {
            prop_assert_eq!(index.find(*k), Some(v), "final content mismatch for key {}", k);
        }
        prop_assert_eq!(index.iter().count(), std_map.len());
    }

    #[test]
    fn test_hash_string_matches_std_map(ops in operations("[a-e]{1,3}")) {
        let mut std_map: HashMap<String, u16> = HashMap::new();
        let mut table: HashString<u16, 16> = HashString::new();

        for op in ops {
            match op {
                Operation::Add(k, v) => {
                    std_map.insert(k.clone(), v);
                    table.add(&k, v);
                }
                Operation::Include(k, v) => {
                    let expected = *std_map.entry(k.clone()).or_insert(v);
                    prop_assert_eq!(*table.include(&k, v), expected);
                }
                Operation::Exclude(k) => {
                    prop_assert_eq!(table.exclude(&k), std_map.remove(&k).is_some());
                }
                Operation::Find(k) => {
                    prop_assert_eq!(table.find(&k), std_map.get(&k));
                }
            }
        }

        prop_assert_eq!(table.len(), std_map.len());
        let copy = table.clone();
        prop_assert_eq!(copy.clone(), table);
    }
}
