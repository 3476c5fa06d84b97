//! Property-based tests for dashboard state and downsampling invariants.
//!
//! Arbitrary key sequences must keep the selection inside the filtered list,
//! the filter must stay an order-preserving subset, and min/max bucketing must
//! never lose a series extreme.

#![allow(clippy::cast_precision_loss)]

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use proptest::prelude::*;

use super::downsample::{ChartTrace, bucketize, downsample};
use super::input::InputRouter;
use super::model::filter_names;
use crate::store::MetricPoint;

// ──────────────────── strategies ────────────────────

fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z_]{1,8}"
}

fn arb_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_name(), 0..20).prop_map(|mut names| {
        let mut seen = std::collections::HashSet::new();
        names.retain(|n| seen.insert(n.clone()));
        names
    })
}

fn arb_key() -> impl Strategy<Value = KeyEvent> {
    prop_oneof![
        Just(KeyCode::Up),
        Just(KeyCode::Down),
        Just(KeyCode::PageUp),
        Just(KeyCode::PageDown),
        Just(KeyCode::Home),
        Just(KeyCode::End),
        Just(KeyCode::Enter),
        Just(KeyCode::Esc),
        Just(KeyCode::Backspace),
        Just(KeyCode::Char('/')),
        Just(KeyCode::Char('j')),
        Just(KeyCode::Char('k')),
        Just(KeyCode::Char('a')),
        Just(KeyCode::Char('o')),
        Just(KeyCode::Char('s')),
    ]
    .prop_map(|code| KeyEvent::new(code, KeyModifiers::NONE))
}

fn arb_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![
            8 => -1.0e6f64..1.0e6,
            1 => Just(f64::NAN),
            1 => Just(f64::INFINITY),
        ],
        0..400,
    )
}

fn points(values: &[f64]) -> Vec<MetricPoint> {
    let now = Utc::now();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| MetricPoint {
            step: i as u64,
            value: *v,
            recorded_at: now,
        })
        .collect()
}

// ──────────────────── properties ────────────────────

proptest! {
    #[test]
    fn filter_is_ordered_case_insensitive_subset(names in arb_names(), query in "[a-zA-Z]{0,3}") {
        let filtered = filter_names(&names, &query);
        let needle = query.to_lowercase();
        let mut cursor = names.iter();
        for name in &filtered {
            prop_assert!(name.to_lowercase().contains(&needle));
            prop_assert!(cursor.any(|n| n == name), "order not preserved");
        }
        let expected = names.iter().filter(|n| n.to_lowercase().contains(&needle)).count();
        prop_assert_eq!(filtered.len(), expected);
    }

    #[test]
    fn selection_stays_in_bounds(
        names in arb_names(),
        keys in prop::collection::vec(arb_key(), 0..60),
        page in 1usize..15,
    ) {
        let mut router = InputRouter::new();
        router.sync_names(&names);
        router.set_page_rows(page);
        for key in &keys {
            router.handle_key(key);
            router.state_mut().ensure_visible(page);
            let state = router.state();
            let len = state.filtered_names().len();
            if len == 0 {
                prop_assert_eq!(state.selected_index(), 0);
            } else {
                prop_assert!(state.selected_index() < len);
                prop_assert!(state.selected_index() >= state.scroll_offset());
                prop_assert!(state.selected_index() < state.scroll_offset() + page);
            }
        }
    }

    #[test]
    fn buckets_partition_the_series(len in 1usize..2_000, columns in 1usize..300) {
        let values: Vec<f64> = (0..len).map(|i| i as f64).collect();
        let buckets = bucketize(&values, columns);
        prop_assert_eq!(buckets.len(), columns.min(len));
        prop_assert_eq!(buckets.first().map(|b| b.start), Some(0));
        prop_assert_eq!(buckets.last().map(|b| b.end), Some(len));
        for pair in buckets.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        prop_assert!(buckets.iter().all(|b| !b.is_empty()));
    }

    #[test]
    fn every_bucket_plots_its_own_extremes(values in arb_values(), columns in 1usize..120) {
        prop_assume!(values.len() > columns);
        let data = downsample(&points(&values), columns);
        let ChartTrace::MinMax { min, max } = &data.trace else {
            return Err(TestCaseError::fail("series longer than the chart must be bucketed"));
        };

        let mut plotted = min.iter().zip(max.iter());
        for bucket in bucketize(&values, columns) {
            let finite: Vec<f64> = values[bucket.start..bucket.end]
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .collect();
            if finite.is_empty() {
                continue;
            }
            let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let Some((&(min_x, min_y), &(max_x, max_y))) = plotted.next() else {
                return Err(TestCaseError::fail("bucket with finite values was not plotted"));
            };
            prop_assert_eq!(min_x, bucket.x());
            prop_assert_eq!(max_x, bucket.x());
            prop_assert_eq!(min_y, lo);
            prop_assert_eq!(max_y, hi);
        }
        prop_assert!(plotted.next().is_none(), "plotted more points than buckets");
    }

    #[test]
    fn downsampling_keeps_global_extremes(values in arb_values(), columns in 1usize..120) {
        let data = downsample(&points(&values), columns);
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        prop_assert_eq!(data.non_finite, values.len() - finite.len());

        let (plotted_min, plotted_max) = match &data.trace {
            ChartTrace::Direct(points) => {
                prop_assert!(points.len() <= columns);
                let ys = points.iter().map(|&(_, y)| y);
                (ys.clone().fold(f64::INFINITY, f64::min), ys.fold(f64::NEG_INFINITY, f64::max))
            }
            ChartTrace::MinMax { min, max } => {
                prop_assert!(min.len() <= columns && max.len() <= columns);
                (
                    min.iter().map(|&(_, y)| y).fold(f64::INFINITY, f64::min),
                    max.iter().map(|&(_, y)| y).fold(f64::NEG_INFINITY, f64::max),
                )
            }
        };

        if finite.is_empty() {
            prop_assert!(data.y_bounds.is_none());
        } else {
            let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(plotted_min, lo);
            prop_assert_eq!(plotted_max, hi);
            let [y_lo, y_hi] = data.y_bounds.expect("finite values have bounds");
            prop_assert!(y_lo <= lo && y_hi >= hi);
        }
    }
}
