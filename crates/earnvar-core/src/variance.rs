//! Variance calculation over a resolved price window.
//!
//! Windows are ascending. The first bar is the anchor (the trading day the
//! window was resolved to); the second bar is the following trading day.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;

use crate::PriceBar;

/// Formula applied to a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VarianceMethod {
    /// `|following.close - anchor.close| / anchor.close`
    #[default]
    CloseToClose,
    /// `|anchor.close - anchor.open| / anchor.open`
    OpenToClose,
}

impl VarianceMethod {
    pub const fn min_bars(self) -> usize {
        match self {
            Self::CloseToClose => 2,
            Self::OpenToClose => 1,
        }
    }
}

/// Reasons a window yields no sample. None of these is a pipeline failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VarianceError {
    #[error("window has {bars} bars, need at least {required}")]
    InsufficientPriceHistory { bars: usize, required: usize },
    #[error("bar {date} has no usable price")]
    MissingPrice { date: Date },
    #[error("reference price is zero")]
    DivisionByZero,
    #[error("variance does not fit in an integer percentage")]
    OutOfRange,
}

/// Canonical close-to-close variance, or `None` when the window cannot produce one.
pub fn compute(bars: &[PriceBar]) -> Option<i64> {
    try_compute(VarianceMethod::CloseToClose, bars).ok()
}

pub fn try_compute(method: VarianceMethod, bars: &[PriceBar]) -> Result<i64, VarianceError> {
    let required = method.min_bars();
    if bars.len() < required {
        return Err(VarianceError::InsufficientPriceHistory {
            bars: bars.len(),
            required,
        });
    }

    let anchor = &bars[0];
    match method {
        VarianceMethod::CloseToClose => {
            percent_move(price(anchor, anchor.close)?, price(&bars[1], bars[1].close)?)
        }
        VarianceMethod::OpenToClose => {
            percent_move(price(anchor, anchor.open)?, price(anchor, anchor.close)?)
        }
    }
}

fn price(bar: &PriceBar, value: Option<Decimal>) -> Result<Decimal, VarianceError> {
    value.ok_or(VarianceError::MissingPrice { date: bar.date })
}

/// `trunc(|to - from| / from * 100)`
fn percent_move(from: Decimal, to: Decimal) -> Result<i64, VarianceError> {
    if from.is_zero() {
        return Err(VarianceError::DivisionByZero);
    }

    (to - from)
        .abs()
        .checked_div(from.abs())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|percent| percent.trunc().to_i64())
        .ok_or(VarianceError::OutOfRange)
}
