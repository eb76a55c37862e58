use oz_core::collections::{hash_str, HashIndex, HashString};

#[test]
fn test_colliding_keys_share_a_bucket() {
    // 2 and 255 land in the same bucket of a 253-bucket index.
    let mut index: HashIndex<&str> = HashIndex::new();
    assert_eq!(index.capacity(), 253);
    index.add(2, "two");
    index.add(255, "two-fifty-five");

    assert_eq!(index.find(2), Some(&"two"));
    assert_eq!(index.find(255), Some(&"two-fifty-five"));

    // Only the first chained entry goes away.
    assert!(index.exclude(255));
    assert_eq!(index.find(2), Some(&"two"));
    assert_eq!(index.len(), 1);
}

#[test]
fn test_add_overwrites_while_include_keeps() {
    let mut names: HashString<u32> = HashString::new();
    names.add("hp", 10);
    names.add("hp", 20);
    names.include("hp", 30);
    names.include("mp", 5);

    assert_eq!(names["hp"], 20);
    assert_eq!(names["mp"], 5);
    assert_eq!(names.len(), 2);

    *names.find_mut("mp").unwrap() += 1;
    assert_eq!(names.find("mp"), Some(&6));
}

#[test]
fn test_clone_reverses_bucket_chains() {
    let mut index: HashIndex<u8> = HashIndex::new();
    index.add(2, 1);
    index.add(255, 2);
    index.add(508, 3);
    index.add(7, 4);

    let copy = index.clone();
    assert_eq!(copy.len(), index.len());
    for key in [2, 255, 508, 7] {
        assert_eq!(copy.find(key), index.find(key));
    }
    // The shared bucket is reversed; cloning twice restores the order.
    assert_ne!(copy, index);
    assert_eq!(copy.clone(), index);
}

#[test]
fn test_equality_is_order_sensitive_within_buckets() {
    // "x" and "z" hash to odd values and share a bucket.
    assert_eq!(hash_str("x") % 2, hash_str("z") % 2);
    let mut a: HashString<i32, 2> = HashString::new();
    let mut b: HashString<i32, 2> = HashString::new();
    a.add("x", 1);
    a.add("z", 2);
    b.add("z", 2);
    b.add("x", 1);
    assert_ne!(a, b);

    b.clear();
    b.add("x", 1);
    b.add("z", 2);
    assert_eq!(a, b);
}

#[test]
fn test_tables_keep_working_past_the_load_limit() {
    let mut index: HashIndex<i32, 4> = HashIndex::new();
    for key in 0..40 {
        index.add(key, key * 2);
    }
    assert!(index.load_factor() > 0.75);
    assert_eq!(index.len(), 40);
    for key in 0..40 {
        assert_eq!(index[key], key * 2);
    }
}

#[test]
fn test_string_buckets_follow_djb2() {
    assert_eq!(hash_str("oz"), (5381 * 33 + u32::from(b'o')) * 33 + u32::from(b'z'));

    let mut table: HashString<&str, 64> = HashString::new();
    let keys = ["alpha", "beta", "gamma", "delta", "epsilon"];
    for key in keys {
        table.add(key, key);
    }
    for key in keys {
        assert_eq!(table[key], key);
    }
    let mut seen: Vec<&str> = table.keys().collect();
    seen.sort_unstable();
    assert_eq!(seen, ["alpha", "beta", "delta", "epsilon", "gamma"]);
}

#[test]
fn test_serialize_as_a_map() {
    let index: HashIndex<u32, 17> = [(1, 10), (40, 400)].into_iter().collect();
    let json = serde_json::to_value(&index).unwrap();
    assert_eq!(json["1"], 10);
    assert_eq!(json["40"], 400);

    let table: HashString<bool> = [("on", true)].into_iter().collect();
    assert_eq!(serde_json::to_string(&table).unwrap(), r#"{"on":true}"#);
}

#[test]
fn test_free_releases_boxed_values() {
    let mut table: HashString<*mut String, 8> = HashString::new();
    for name in ["a", "b", "c"] {
        table.add(name, Box::into_raw(Box::new(name.repeat(100))));
    }
    unsafe { table.free() };
    assert!(table.is_empty());

    // The table is still usable afterwards.
    table.add("d", Box::into_raw(Box::new(String::new())));
    unsafe { table.free() };
}

#[test]
fn test_dealloc_after_clear_and_reuse() {
    let mut index: HashIndex<Vec<u8>, 8> = HashIndex::new();
    for key in 0..20 {
        index.add(key, vec![0; 32]);
    }
    index.clear();
    index.dealloc();
    index.add(3, vec![3]);
    assert_eq!(index[3], [3]);
}
