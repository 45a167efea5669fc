//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::data_source::DEFAULT_HISTORY_LIMIT;
use crate::resolver::DEFAULT_MAX_LOOKBACK_DAYS;
use crate::signal::DEFAULT_THRESHOLD;
use crate::variance::VarianceMethod;
use crate::ReportDate;

/// What to do when the report history lists the same date more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Every occurrence produces its own sample.
    #[default]
    Keep,
    /// Only the first occurrence of each date is looked up.
    Dedupe,
}

impl DuplicatePolicy {
    pub fn apply(self, dates: Vec<ReportDate>) -> Vec<ReportDate> {
        match self {
            Self::Keep => dates,
            Self::Dedupe => {
                let mut seen = std::collections::HashSet::with_capacity(dates.len());
                dates.into_iter().filter(|date| seen.insert(*date)).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Minimum percent a single sample must exceed for the symbol to be kept.
    pub threshold: i64,
    /// Calendar days a pre-market lookup may walk back.
    pub max_lookback_days: u32,
    /// Trading rows requested per historical window.
    pub history_limit: usize,
    /// Concurrent per-date tasks.
    pub workers: usize,
    pub duplicate_policy: DuplicatePolicy,
    pub method: VarianceMethod,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            workers: default_workers(),
            duplicate_policy: DuplicatePolicy::default(),
            method: VarianceMethod::default(),
        }
    }
}

/// `min(32, cpus + 4)`: most of the per-date work is waiting on the network.
pub fn default_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1);
    (cpus + 4).min(32)
}
