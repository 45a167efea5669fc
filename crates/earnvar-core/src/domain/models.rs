use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use super::{ReportDate, Symbol};

const PRE_MARKET: &str = "time-pre-market";
const AFTER_HOURS: &str = "time-after-hours";
const NOT_SUPPLIED: &str = "time-not-supplied";

/// When a company released earnings relative to market hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportTiming {
    PreMarket,
    AfterHours,
    Unspecified,
}

impl ReportTiming {
    /// Maps the calendar's `time` field. Returns `None` for the
    /// "not supplied" sentinel, whose rows never reach the pipeline.
    pub fn from_upstream(value: &str) -> Option<Self> {
        match value.trim() {
            NOT_SUPPLIED => None,
            PRE_MARKET => Some(Self::PreMarket),
            AFTER_HOURS => Some(Self::AfterHours),
            _ => Some(Self::Unspecified),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreMarket => "pre-market",
            Self::AfterHours => "after-hours",
            Self::Unspecified => "unspecified",
        }
    }
}

impl Display for ReportTiming {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One company on the daily earnings calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRow {
    pub symbol: Symbol,
    pub timing: ReportTiming,
}

/// Daily bar reduced to the two prices the calculator uses.
///
/// A price is `None` when the upstream sent a placeholder such as `N/A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: Date,
    pub open: Option<Decimal>,
    pub close: Option<Decimal>,
}

impl PriceBar {
    pub const fn new(date: Date, open: Decimal, close: Decimal) -> Self {
        Self::with_prices(date, Some(open), Some(close))
    }

    pub const fn with_prices(date: Date, open: Option<Decimal>, close: Option<Decimal>) -> Self {
        Self { date, open, close }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarianceSample {
    pub report_date: ReportDate,
    pub percent: i64,
}

/// Every sample gathered for one symbol, plus their truncated mean.
///
/// Built only after all per-date lookups finished, so a partially
/// aggregated result is never observable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolVarianceResult {
    pub symbol: Symbol,
    pub timing: ReportTiming,
    pub samples: Vec<VarianceSample>,
    pub average: i64,
}

impl SymbolVarianceResult {
    pub fn new(symbol: Symbol, timing: ReportTiming, samples: Vec<VarianceSample>) -> Self {
        let average = mean_percent(&samples);
        Self {
            symbol,
            timing,
            samples,
            average,
        }
    }

    pub fn empty(symbol: Symbol, timing: ReportTiming) -> Self {
        Self::new(symbol, timing, Vec::new())
    }

    pub fn percents(&self) -> impl Iterator<Item = i64> + '_ {
        self.samples.iter().map(|sample| sample.percent)
    }
}

fn mean_percent(samples: &[VarianceSample]) -> i64 {
    if samples.is_empty() {
        return 0;
    }
    let sum: i128 = samples.iter().map(|s| i128::from(s.percent)).sum();
    // Percents are non-negative, so truncation equals floor.
    (sum / samples.len() as i128) as i64
}
