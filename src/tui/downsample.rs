//! Min-max bucketing of a metric series to fit the chart width.
//!
//! A series longer than the available columns is split into one contiguous
//! bucket per column; each bucket contributes its true minimum and maximum,
//! so spikes survive regardless of how many points share a column. Shorter
//! series are plotted point for point.
//!
//! The x coordinate is the arrival position of a point, not its step: steps
//! are caller-supplied and may repeat or go backwards.

#![allow(clippy::cast_precision_loss)]

use crate::store::MetricPoint;

/// Min/max summary of one contiguous run of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Index of the first point in the bucket.
    pub start: usize,
    /// One past the last point in the bucket.
    pub end: usize,
    /// Smallest finite value, `None` when the bucket holds no finite value.
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bucket {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Plot position: the centre of the bucket's index range.
    #[must_use]
    pub fn x(&self) -> f64 {
        (self.start + self.end.saturating_sub(1)) as f64 / 2.0
    }
}

/// Split `values` into `columns` contiguous, non-empty buckets.
///
/// Requires `values.len() >= columns`; bucket `i` covers
/// `[i * n / columns, (i + 1) * n / columns)`.
#[must_use]
pub fn bucketize(values: &[f64], columns: usize) -> Vec<Bucket> {
    let n = values.len();
    if n == 0 || columns == 0 {
        return Vec::new();
    }
    let columns = columns.min(n);
    (0..columns)
        .map(|i| {
            let start = i * n / columns;
            let end = (i + 1) * n / columns;
            let (min, max) = finite_extremes(&values[start..end]);
            Bucket {
                start,
                end,
                min,
                max,
            }
        })
        .collect()
}

fn finite_extremes(values: &[f64]) -> (Option<f64>, Option<f64>) {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((None, None), |(lo, hi), v| {
            (
                Some(lo.map_or(v, |lo: f64| lo.min(v))),
                Some(hi.map_or(v, |hi: f64| hi.max(v))),
            )
        })
}

/// Plot-ready traces.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartTrace {
    /// Fewer points than columns: every finite point as-is.
    Direct(Vec<(f64, f64)>),
    /// One (x, min) and one (x, max) per bucket with a finite value. A
    /// single-valued bucket contributes the same point to both traces.
    MinMax {
        min: Vec<(f64, f64)>,
        max: Vec<(f64, f64)>,
    },
}

/// Chart input derived from one series snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub trace: ChartTrace,
    pub x_bounds: [f64; 2],
    /// `None` when the series holds no finite value at all.
    pub y_bounds: Option<[f64; 2]>,
    /// NaN/±inf points left out of the plot.
    pub non_finite: usize,
    pub first_step: Option<u64>,
    pub last_step: Option<u64>,
    pub total_points: usize,
}

impl ChartData {
    #[must_use]
    pub const fn is_bucketed(&self) -> bool {
        matches!(self.trace, ChartTrace::MinMax { .. })
    }
}

/// Reduce `points` to at most `columns` x positions.
#[must_use]
pub fn downsample(points: &[MetricPoint], columns: usize) -> ChartData {
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let non_finite = values.iter().filter(|v| !v.is_finite()).count();
    let columns = columns.max(1);

    let trace = if values.len() <= columns {
        ChartTrace::Direct(
            values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(|(i, v)| (i as f64, *v))
                .collect(),
        )
    } else {
        let buckets = bucketize(&values, columns);
        let mut min = Vec::with_capacity(buckets.len());
        let mut max = Vec::with_capacity(buckets.len());
        for bucket in &buckets {
            if let (Some(lo), Some(hi)) = (bucket.min, bucket.max) {
                min.push((bucket.x(), lo));
                max.push((bucket.x(), hi));
            }
        }
        ChartTrace::MinMax { min, max }
    };

    let (lo, hi) = finite_extremes(&values);
    let y_bounds = match (lo, hi) {
        (Some(lo), Some(hi)) => Some(pad_bounds(lo, hi)),
        _ => None,
    };
    let x_max = values.len().saturating_sub(1).max(1) as f64;

    ChartData {
        trace,
        x_bounds: [0.0, x_max],
        y_bounds,
        non_finite,
        first_step: points.first().map(|p| p.step),
        last_step: points.last().map(|p| p.step),
        total_points: points.len(),
    }
}

/// Widen a degenerate or tight range so a flat line is not drawn on the
/// chart border.
fn pad_bounds(lo: f64, hi: f64) -> [f64; 2] {
    let span = hi - lo;
    let pad = if span > f64::EPSILON {
        span * 0.05
    } else {
        (lo.abs() * 0.05).max(0.5)
    };
    let lower = lo - pad;
    let upper = hi + pad;
    if lower.is_finite() && upper.is_finite() {
        [lower, upper]
    } else {
        [lo, hi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn series(values: &[f64]) -> Vec<MetricPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricPoint {
                step: i as u64,
                value: *v,
                recorded_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn short_series_plots_directly() {
        let data = downsample(&series(&[1.0, 0.5]), 80);
        assert_eq!(data.trace, ChartTrace::Direct(vec![(0.0, 1.0), (1.0, 0.5)]));
        assert!(!data.is_bucketed());
        assert_eq!(data.first_step, Some(0));
        assert_eq!(data.last_step, Some(1));
    }

    #[test]
    fn buckets_cover_every_point_exactly_once() {
        let values: Vec<f64> = (0..103).map(f64::from).collect();
        let buckets = bucketize(&values, 10);
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0].start, 0);
        assert_eq!(buckets[9].end, 103);
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!(buckets.iter().all(|b| !b.is_empty()));
        assert_eq!(buckets.iter().map(Bucket::len).sum::<usize>(), 103);
    }

    #[test]
    fn spike_survives_bucketing() {
        let mut values = vec![0.0; 1_000];
        values[517] = 42.0;
        values[518] = -13.0;
        let data = downsample(&series(&values), 20);
        let ChartTrace::MinMax { min, max } = &data.trace else {
            panic!("expected bucketed trace");
        };
        assert!(max.iter().any(|&(_, y)| (y - 42.0).abs() < f64::EPSILON));
        assert!(min.iter().any(|&(_, y)| (y + 13.0).abs() < f64::EPSILON));
        assert_eq!(max.len(), 20);
    }

    #[test]
    fn non_finite_values_are_counted_and_skipped() {
        let data = downsample(&series(&[1.0, f64::NAN, f64::INFINITY, 3.0]), 10);
        assert_eq!(data.non_finite, 2);
        assert_eq!(data.trace, ChartTrace::Direct(vec![(0.0, 1.0), (3.0, 3.0)]));
        let [lo, hi] = data.y_bounds.expect("finite values present");
        assert!(lo < 1.0 && hi > 3.0);
    }

    #[test]
    fn all_non_finite_has_no_y_bounds() {
        let data = downsample(&series(&[f64::NAN, f64::NEG_INFINITY]), 10);
        assert_eq!(data.y_bounds, None);
        assert_eq!(data.non_finite, 2);
    }

    #[test]
    fn flat_series_gets_padded_bounds() {
        let data = downsample(&series(&[2.0, 2.0, 2.0]), 10);
        let [lo, hi] = data.y_bounds.expect("bounds");
        assert!(lo < 2.0 && hi > 2.0);
    }

    #[test]
    fn empty_series_is_empty_direct_trace() {
        let data = downsample(&[], 10);
        assert_eq!(data.trace, ChartTrace::Direct(Vec::new()));
        assert_eq!(data.total_points, 0);
        assert_eq!(data.first_step, None);
    }
}
