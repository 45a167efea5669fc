use crate::SymbolVarianceResult;

pub const DEFAULT_THRESHOLD: i64 = 5;

/// True when any sample moved strictly more than `threshold` percent.
pub fn is_significant(result: &SymbolVarianceResult, threshold: i64) -> bool {
    result.percents().any(|percent| percent > threshold)
}

/// Threshold-carrying wrapper around [`is_significant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalFilter {
    threshold: i64,
}

impl Default for SignalFilter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SignalFilter {
    pub const fn new(threshold: i64) -> Self {
        Self { threshold }
    }

    pub const fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn is_significant(&self, result: &SymbolVarianceResult) -> bool {
        is_significant(result, self.threshold)
    }
}
