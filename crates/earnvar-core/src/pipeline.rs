//! End-to-end driver: calendar, watch-list, per-symbol aggregation, filter.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::Date;
use tracing::{info, warn};

use crate::aggregate::ConcurrentAggregator;
use crate::config::PipelineConfig;
use crate::data_source::MarketDataSource;
use crate::fetch::FetchError;
use crate::resolver::TradingDayResolver;
use crate::signal::SignalFilter;
use crate::watchlist::Watchlist;
use crate::{format_iso_date, CalendarRow, ReportTiming, Symbol, SymbolVarianceResult};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no earnings calendar available for {date}")]
    CalendarUnavailable { date: Date },

    #[error("earnings calendar fetch failed: {0}")]
    Calendar(#[from] FetchError),
}

/// A retained symbol together with the watch-lists it appears on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEntry {
    #[serde(flatten)]
    pub result: SymbolVarianceResult,
    pub platforms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub date: Date,
    /// Calendar rows with a supplied report time.
    pub calendar_rows: usize,
    /// Distinct symbols that passed the watch-list.
    pub watched: usize,
    /// Significant symbols, ordered by ticker.
    pub entries: Vec<ScanEntry>,
}

pub struct VariancePipeline {
    source: Arc<dyn MarketDataSource>,
    aggregator: ConcurrentAggregator,
    filter: SignalFilter,
    watchlist: Watchlist,
    config: PipelineConfig,
}

impl VariancePipeline {
    pub fn new(source: Arc<dyn MarketDataSource>, config: PipelineConfig) -> Self {
        let resolver = TradingDayResolver::new(Arc::clone(&source))
            .with_max_lookback_days(config.max_lookback_days)
            .with_history_limit(config.history_limit);
        let aggregator =
            ConcurrentAggregator::new(Arc::clone(&source), resolver, config.method, config.workers);

        Self {
            source,
            aggregator,
            filter: SignalFilter::new(config.threshold),
            watchlist: Watchlist::unrestricted(),
            config,
        }
    }

    pub fn with_watchlist(mut self, watchlist: Watchlist) -> Self {
        self.watchlist = watchlist;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Scans the calendar of `date`. Symbols are processed one after another.
    pub async fn run(&self, date: Date) -> Result<ScanReport, PipelineError> {
        let rows = self
            .source
            .calendar(date)
            .await?
            .ok_or(PipelineError::CalendarUnavailable { date })?;
        let calendar_rows = rows.len();

        let watched = self.watched_rows(rows);
        info!(
            date = %format_iso_date(date),
            calendar_rows,
            watched = watched.len(),
            "scanning earnings calendar"
        );

        let mut entries = Vec::new();
        for row in &watched {
            let result = self.analyze_symbol(&row.symbol, row.timing).await;
            if self.filter.is_significant(&result) {
                let platforms = self.watchlist.platforms_for(&result.symbol);
                entries.push(ScanEntry { result, platforms });
            }
        }
        entries.sort_by(|a, b| a.result.symbol.cmp(&b.result.symbol));

        info!(
            date = %format_iso_date(date),
            retained = entries.len(),
            "scan complete"
        );

        Ok(ScanReport {
            date,
            calendar_rows,
            watched: watched.len(),
            entries,
        })
    }

    /// Full aggregation for one symbol. A failed history lookup yields an
    /// empty result rather than an error.
    pub async fn analyze_symbol(&self, symbol: &Symbol, timing: ReportTiming) -> SymbolVarianceResult {
        let report_dates = match self.source.report_dates(symbol).await {
            Ok(dates) => self.config.duplicate_policy.apply(dates),
            Err(error) => {
                warn!(
                    %symbol,
                    %error,
                    timeout = error.is_timeout(),
                    "report history unavailable"
                );
                return SymbolVarianceResult::empty(symbol.clone(), timing);
            }
        };

        let result = self
            .aggregator
            .aggregate(symbol, timing, &report_dates)
            .await;
        info!(
            %symbol,
            %timing,
            samples = result.samples.len(),
            average = result.average,
            "symbol analyzed"
        );
        result
    }

    pub fn is_significant(&self, result: &SymbolVarianceResult) -> bool {
        self.filter.is_significant(result)
    }

    /// Watch-listed rows, first occurrence per symbol.
    fn watched_rows(&self, rows: Vec<CalendarRow>) -> Vec<CalendarRow> {
        let mut seen = HashSet::new();
        rows.into_iter()
            .filter(|row| self.watchlist.admits(&row.symbol))
            .filter(|row| seen.insert(row.symbol.clone()))
            .collect()
    }
}

impl std::fmt::Debug for VariancePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariancePipeline")
            .field("aggregator", &self.aggregator)
            .field("filter", &self.filter)
            .field("watchlist", &self.watchlist)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
