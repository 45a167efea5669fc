//! Upstream collaborators of the variance pipeline.
//!
//! | Method | Returns | Description |
//! |--------|---------|-------------|
//! | [`calendar`](MarketDataSource::calendar) | `Option<Vec<CalendarRow>>` | Companies reporting on a day |
//! | [`report_dates`](MarketDataSource::report_dates) | `Vec<ReportDate>` | Historical report days of a symbol |
//! | [`price_window`](MarketDataSource::price_window) | `Vec<PriceBar>` | Daily bars from a start date, ascending |

use std::future::Future;
use std::pin::Pin;

use time::Date;

use crate::fetch::FetchError;
use crate::{CalendarRow, PriceBar, ReportDate, Symbol, ValidationError};

/// Trading rows requested per historical window.
pub const DEFAULT_HISTORY_LIMIT: usize = 365;

/// Bounded historical-price request produced by the trading-day resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HistoricalWindowRequest {
    pub symbol: Symbol,
    pub start: Date,
    pub limit: usize,
}

impl HistoricalWindowRequest {
    pub fn new(symbol: Symbol, start: Date, limit: usize) -> Result<Self, ValidationError> {
        if limit == 0 {
            return Err(ValidationError::ZeroHistoryLimit);
        }
        Ok(Self {
            symbol,
            start,
            limit,
        })
    }
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// per-date task of an aggregation.
pub trait MarketDataSource: Send + Sync {
    /// Calendar rows for `date`, with "time not supplied" rows already removed.
    ///
    /// `Ok(None)` means the upstream has no calendar for that day.
    fn calendar<'a>(
        &'a self,
        date: Date,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<CalendarRow>>, FetchError>> + Send + 'a>>;

    /// Historical report dates in upstream order. Duplicates are passed through.
    fn report_dates<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ReportDate>, FetchError>> + Send + 'a>>;

    /// Bars from `request.start` onward, sorted ascending by date.
    ///
    /// The first bar is the earliest trading day on or after the start date.
    fn price_window<'a>(
        &'a self,
        request: &'a HistoricalWindowRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PriceBar>, FetchError>> + Send + 'a>>;
}
