//! Usage snapshot model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-feature consumption counts for a tenant's current billing or trial
/// period.
///
/// Counts arrive as signed integers because upstream stores report them that
/// way; reads clamp negatives to zero. Period rollover and atomicity of the
/// underlying counters are the usage source's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageSnapshot {
    counts: HashMap<String, i64>,
}

impl UsageSnapshot {
    /// Empty snapshot: every feature reads as zero consumption.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts<I, K>(counts: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        Self {
            counts: counts.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn set(&mut self, feature_id: impl Into<String>, count: i64) {
        self.counts.insert(feature_id.into(), count);
    }

    /// Consumption for a feature. Missing features read as 0; negative
    /// counts are clamped to 0.
    pub fn count(&self, feature_id: &str) -> u64 {
        self.counts
            .get(feature_id)
            .copied()
            .unwrap_or(0)
            .max(0) as u64
    }
}
