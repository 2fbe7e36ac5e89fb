use proptest::prelude::*;

/// Strategy for distinct lowercase environment names
pub fn environment_names_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{2,8}", 1..4).prop_map(|names| names.into_iter().collect())
}

/// Strategy for distinct region names; the first one is the primary
pub fn region_names_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{2}-[a-z]{4}-[1-9]", 1..5)
        .prop_map(|names| names.into_iter().collect())
}

/// Strategy for a sequence of (endpoint index, passed) probe results
pub fn probe_sequence_strategy(endpoints: usize) -> impl Strategy<Value = Vec<(usize, bool)>> {
    prop::collection::vec((0..endpoints, any::<bool>()), 0..40)
}
