//! Named, bounded metric series shared between producer threads and the
//! dashboard.
//!
//! Two lock levels: a registry `RwLock` guarding the name set (written only the
//! first time a name is seen), and one `Mutex` per series guarding append/evict
//! and copy-out. Producers writing different series never contend on the same
//! series lock, and the renderer only ever holds a lock for one copy.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use super::ring::BoundedRing;

/// One recorded sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Caller-supplied step; not required to be monotonic.
    pub step: u64,
    /// Raw value, stored as given (NaN and infinities included).
    pub value: f64,
    /// Wall-clock time the store accepted the point.
    pub recorded_at: DateTime<Utc>,
}

struct SeriesSlot {
    name: String,
    points: Mutex<BoundedRing<MetricPoint>>,
}

#[derive(Default)]
struct Registry {
    index: HashMap<String, usize>,
    order: Vec<Arc<SeriesSlot>>,
}

/// Thread-safe mapping from metric name to a bounded series.
pub struct MetricStore {
    registry: RwLock<Registry>,
    capacity: usize,
}

impl MetricStore {
    /// Create a store whose series each retain at most `capacity` points.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            capacity: capacity.max(1),
        }
    }

    /// Append a point to `name`, creating the series on first use.
    ///
    /// Never fails. When the series is full the oldest point is dropped.
    pub fn record(&self, name: &str, value: f64, step: u64) {
        let point = MetricPoint {
            step,
            value,
            recorded_at: Utc::now(),
        };

        if let Some(slot) = self.slot(name) {
            slot.points.lock().push(point);
            return;
        }

        let mut registry = self.registry.write();
        // Another producer may have created it between the two locks.
        if let Some(&idx) = registry.index.get(name) {
            let slot = Arc::clone(&registry.order[idx]);
            drop(registry);
            slot.points.lock().push(point);
            return;
        }

        // The first point goes in before the name becomes visible, so a reader
        // never observes a registered series with no points.
        let mut ring = BoundedRing::new(self.capacity);
        ring.push(point);
        let idx = registry.order.len();
        registry.order.push(Arc::new(SeriesSlot {
            name: name.to_string(),
            points: Mutex::new(ring),
        }));
        registry.index.insert(name.to_string(), idx);
    }

    /// Metric names in first-seen order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.registry
            .read()
            .order
            .iter()
            .map(|slot| slot.name.clone())
            .collect()
    }

    /// Copy of the points currently retained for `name`, oldest first.
    /// Unknown names yield an empty vector.
    #[must_use]
    pub fn snapshot(&self, name: &str) -> Vec<MetricPoint> {
        self.slot(name)
            .map(|slot| slot.points.lock().to_vec())
            .unwrap_or_default()
    }

    /// Most recent point of `name`, if any.
    #[must_use]
    pub fn latest(&self, name: &str) -> Option<MetricPoint> {
        self.slot(name)
            .and_then(|slot| slot.points.lock().back().copied())
    }

    /// Number of points currently retained for `name`.
    #[must_use]
    pub fn series_len(&self, name: &str) -> usize {
        self.slot(name).map_or(0, |slot| slot.points.lock().len())
    }

    /// Number of distinct series.
    /// Number of distinct series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.read().order.len()
    }

    /// True until the first point is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-series point capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    fn slot(&self, name: &str) -> Option<Arc<SeriesSlot>> {
        let registry = self.registry.read();
        registry
            .index
            .get(name)
            .map(|&idx| Arc::clone(&registry.order[idx]))
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new(crate::core::config::StoreConfig::default().metric_capacity)
    }
}

impl std::fmt::Debug for MetricStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricStore")
            .field("series", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
