use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

/// Small alphabet plus a few high bytes, so keys share prefixes often and
/// still cover multi-byte territory.
fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    let byte = prop_oneof![
        4 => prop::sample::select(vec![b'a', b'b', b'c']),
        1 => any::<u8>(),
    ];
    prop::collection::vec(byte, 0..=12)
}

fn key_set_strategy() -> impl Strategy<Value = BTreeMap<Vec<u8>, i32>> {
    prop::collection::btree_map(key_strategy(), 0..=i32::MAX, 1..=300)
}

fn build_model(model: &BTreeMap<Vec<u8>, i32>) -> DoubleArray {
    let keys: Vec<&[u8]> = model.keys().map(Vec::as_slice).collect();
    let values: Vec<i32> = model.values().copied().collect();
    DoubleArray::build_with_values(&keys, &values).unwrap()
}

/// Every owned slot must point at an in-range parent whose base reaches it.
fn validate_array(da: &DoubleArray) {
    let nodes = da.nodes();
    assert!(nodes[0].is_child_of(0), "root must own itself");
    for (i, node) in nodes.iter().enumerate().skip(1) {
        let Some(parent) = node.check() else {
            continue;
        };
        let parent_node = &nodes[parent as usize];
        assert!(!parent_node.is_leaf(), "slot {i} owned by a terminal slot");
        let label = parent_node.base() ^ i as u32;
        assert!(label <= 256, "slot {i} unreachable from parent {parent}");
        assert_eq!(node.is_leaf(), label == 0, "slot {i} terminal mismatch");
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_exact_match_equivalence(
        model in key_set_strategy(),
        probes in prop::collection::vec(key_strategy(), 0..=50),
    ) {
        let da = build_model(&model);
        validate_array(&da);

        for (key, &value) in &model {
            prop_assert_eq!(da.exact_match(key), Some(value));
        }
        for probe in &probes {
            prop_assert_eq!(da.exact_match(probe), model.get(probe).copied());
        }
    }

    #[test]
    fn prop_common_prefix_equivalence(
        model in key_set_strategy(),
        query in key_strategy(),
        max_results in 0usize..8,
    ) {
        let da = build_model(&model);

        let expected: Vec<PrefixMatch> = (0..=query.len())
            .filter_map(|len| {
                model.get(&query[..len]).map(|&value| PrefixMatch { len, value })
            })
            .collect();
        let got: Vec<PrefixMatch> = da.common_prefixes(&query).collect();
        prop_assert_eq!(&got, &expected);

        let capped: Vec<i32> = expected.iter().take(max_results).map(|m| m.value).collect();
        prop_assert_eq!(da.common_prefix_search(&query, max_results), capped);
    }

    #[test]
    fn prop_traverse_step_matches_exact_match(
        model in key_set_strategy(),
        query in key_strategy(),
    ) {
        let da = build_model(&model);

        let mut node = 0;
        for (i, &byte) in query.iter().enumerate() {
            match da.traverse_step(node, byte) {
                Some(t) => {
                    prop_assert_eq!(t.value, model.get(&query[..=i]).copied());
                    node = t.node;
                }
                None => {
                    // No key may extend a prefix the trie does not contain.
                    let prefix = &query[..=i];
                    prop_assert!(model.keys().all(|k| !k.starts_with(prefix)));
                    break;
                }
            }
        }
    }

    #[test]
    fn prop_serial_round_trip(model in key_set_strategy()) {
        let da = build_model(&model);
        let bytes = da.as_bytes();
        let loaded = DoubleArray::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&loaded, &da);
        for (key, &value) in &model {
            prop_assert_eq!(loaded.exact_match(key), Some(value));
        }
    }

    #[test]
    fn prop_rebuild_is_deterministic(model in key_set_strategy()) {
        prop_assert_eq!(build_model(&model), build_model(&model));
    }

    #[test]
    fn prop_from_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = DoubleArray::from_bytes(&bytes);
    }

    #[test]
    fn prop_search_on_arbitrary_slots_never_panics(
        raw in prop::collection::vec((any::<i32>(), any::<i32>()), 1..64),
        query in key_strategy(),
    ) {
        let nodes: Vec<Node> = raw.iter().map(|&(b, c)| Node::from_raw(b, c)).collect();
        let da = DoubleArray::new(nodes);
        let _ = da.exact_match(&query);
        let _ = da.common_prefix_search(&query, 16);
        if let Some(&byte) = query.first() {
            let _ = da.traverse_step(0, byte);
        }
    }

    #[test]
    fn prop_dictionary_text_keys(words in prop::collection::vec("\\PC{0,6}", 1..60)) {
        let dict = Dictionary::build(&words).unwrap();
        let mut sorted = words.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(dict.num_keys(), Some(sorted.len()));
        for (i, word) in sorted.iter().enumerate() {
            prop_assert_eq!(dict.exact_match(word), Some(i as i32));
        }
    }
}
