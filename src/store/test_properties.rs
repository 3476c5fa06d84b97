//! Property-based tests for ring eviction and name ordering.

use proptest::prelude::*;

use super::metrics::MetricStore;

proptest! {
    #[test]
    fn overflow_retains_exactly_the_newest_capacity_points(
        capacity in 1usize..64,
        extra in 1usize..64,
    ) {
        let store = MetricStore::new(capacity);
        let total = capacity + extra;
        for i in 0..total {
            store.record("m", f64::from(u32::try_from(i).unwrap()), i as u64);
        }
        let steps: Vec<u64> = store.snapshot("m").iter().map(|p| p.step).collect();
        let expected: Vec<u64> = (extra as u64..total as u64).collect();
        prop_assert_eq!(steps, expected);
    }

    #[test]
    fn below_capacity_nothing_is_lost(count in 0usize..128) {
        let store = MetricStore::new(128);
        for i in 0..count {
            store.record("m", 0.0, i as u64);
        }
        prop_assert_eq!(store.series_len("m"), count);
    }

    #[test]
    fn names_are_first_seen_order(writes in proptest::collection::vec(0u8..8, 0..64)) {
        let store = MetricStore::new(4);
        let mut expected: Vec<String> = Vec::new();
        for id in &writes {
            let name = format!("metric_{id}");
            if !expected.contains(&name) {
                expected.push(name.clone());
            }
            store.record(&name, 1.0, 0);
        }
        prop_assert_eq!(store.names(), expected);
    }
}
