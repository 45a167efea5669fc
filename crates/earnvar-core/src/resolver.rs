//! Trading-day resolution: which historical window measures a report's move.

use std::sync::Arc;

use thiserror::Error;
use time::Date;
use tracing::debug;

use crate::data_source::{HistoricalWindowRequest, MarketDataSource, DEFAULT_HISTORY_LIMIT};
use crate::{format_iso_date, ReportDate, ReportTiming, Symbol, ValidationError};

/// Calendar days probed before a pre-market lookup gives up.
pub const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no trading day before {report_date} found for {symbol} within {lookback_days} days")]
    NoTradingDayFound {
        symbol: Symbol,
        report_date: ReportDate,
        lookback_days: u32,
    },

    #[error("report date {report_date} has no representable neighbour")]
    DateOutOfRange { report_date: ReportDate },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Maps a report date and its timing onto the window to fetch.
#[derive(Clone)]
pub struct TradingDayResolver {
    source: Arc<dyn MarketDataSource>,
    max_lookback_days: u32,
    history_limit: usize,
}

impl TradingDayResolver {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            source,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_max_lookback_days(mut self, max_lookback_days: u32) -> Self {
        self.max_lookback_days = max_lookback_days;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub const fn max_lookback_days(&self) -> u32 {
        self.max_lookback_days
    }

    /// After-hours and unspecified reports start on the following calendar day.
    ///
    /// Pre-market reports walk back from the day before the report until a
    /// window's earliest bar is dated on some day other than the report date;
    /// that bar's date becomes the window start.
    pub async fn resolve(
        &self,
        symbol: &Symbol,
        report_date: ReportDate,
        timing: ReportTiming,
    ) -> Result<HistoricalWindowRequest, ResolveError> {
        match timing {
            ReportTiming::AfterHours | ReportTiming::Unspecified => {
                let start = report_date
                    .next_day()
                    .ok_or(ResolveError::DateOutOfRange { report_date })?;
                Ok(self.request(symbol, start)?)
            }
            ReportTiming::PreMarket => self.walk_back(symbol, report_date).await,
        }
    }

    async fn walk_back(
        &self,
        symbol: &Symbol,
        report_date: ReportDate,
    ) -> Result<HistoricalWindowRequest, ResolveError> {
        let candidates = std::iter::successors(report_date.previous_day(), |day| day.previous_day())
            .take(self.max_lookback_days as usize);

        for candidate in candidates {
            let probe = self.request(symbol, candidate)?;
            match self.source.price_window(&probe).await {
                Ok(bars) => match bars.first() {
                    Some(earliest) if earliest.date != report_date => {
                        debug!(
                            %symbol,
                            report_date = %format_iso_date(report_date),
                            start = %format_iso_date(earliest.date),
                            "resolved pre-market window start"
                        );
                        return Ok(self.request(symbol, earliest.date)?);
                    }
                    Some(_) => {}
                    None => debug!(
                        %symbol,
                        candidate = %format_iso_date(candidate),
                        "empty window while walking back"
                    ),
                },
                Err(error) => debug!(
                    %symbol,
                    candidate = %format_iso_date(candidate),
                    %error,
                    "window fetch failed while walking back"
                ),
            }
        }

        Err(ResolveError::NoTradingDayFound {
            symbol: symbol.clone(),
            report_date,
            lookback_days: self.max_lookback_days,
        })
    }

    fn request(&self, symbol: &Symbol, start: Date) -> Result<HistoricalWindowRequest, ValidationError> {
        HistoricalWindowRequest::new(symbol.clone(), start, self.history_limit)
    }
}

impl std::fmt::Debug for TradingDayResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingDayResolver")
            .field("max_lookback_days", &self.max_lookback_days)
            .field("history_limit", &self.history_limit)
            .finish_non_exhaustive()
    }
}
