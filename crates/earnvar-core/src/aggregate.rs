//! Concurrent fan-out over a symbol's report dates.
//!
//! Every report date becomes one task (resolve, fetch the window, compute).
//! Tasks are joined in completion order and folded into a
//! [`SymbolVarianceResult`]. A failing date contributes nothing; it never
//! cancels its siblings.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::data_source::MarketDataSource;
use crate::fetch::FetchError;
use crate::resolver::{ResolveError, TradingDayResolver};
use crate::variance::{try_compute, VarianceError, VarianceMethod};
use crate::{format_iso_date, ReportDate, ReportTiming, Symbol, SymbolVarianceResult, VarianceSample};

/// Why a single report date produced no sample.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Variance(#[from] VarianceError),
    #[error("worker pool closed")]
    PoolClosed,
}

impl SampleError {
    /// Short windows and zero prices are expected data gaps, not failures.
    pub const fn is_data_gap(&self) -> bool {
        matches!(self, Self::Variance(_))
    }
}

#[derive(Clone)]
pub struct ConcurrentAggregator {
    source: Arc<dyn MarketDataSource>,
    resolver: Arc<TradingDayResolver>,
    method: VarianceMethod,
    permits: Arc<Semaphore>,
}

impl ConcurrentAggregator {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        resolver: TradingDayResolver,
        method: VarianceMethod,
        workers: usize,
    ) -> Self {
        Self {
            source,
            resolver: Arc::new(resolver),
            method,
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Waits for every date before returning.
    pub async fn aggregate(
        &self,
        symbol: &Symbol,
        timing: ReportTiming,
        report_dates: &[ReportDate],
    ) -> SymbolVarianceResult {
        let mut tasks = JoinSet::new();
        for &report_date in report_dates {
            let source = Arc::clone(&self.source);
            let resolver = Arc::clone(&self.resolver);
            let permits = Arc::clone(&self.permits);
            let symbol = symbol.clone();
            let method = self.method;

            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => {
                        sample_for_date(
                            source.as_ref(),
                            &resolver,
                            &symbol,
                            report_date,
                            timing,
                            method,
                        )
                        .await
                    }
                    Err(_) => Err(SampleError::PoolClosed),
                };
                (report_date, outcome)
            });
        }

        let mut samples = Vec::with_capacity(report_dates.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(sample))) => samples.push(sample),
                Ok((report_date, Err(error))) if error.is_data_gap() => debug!(
                    %symbol,
                    report_date = %format_iso_date(report_date),
                    %error,
                    "no sample for report date"
                ),
                Ok((report_date, Err(error))) => warn!(
                    %symbol,
                    report_date = %format_iso_date(report_date),
                    %error,
                    "report date lookup failed"
                ),
                Err(join_error) => warn!(%symbol, %join_error, "report date task aborted"),
            }
        }

        let result = SymbolVarianceResult::new(symbol.clone(), timing, samples);
        debug!(
            %symbol,
            dates = report_dates.len(),
            samples = result.samples.len(),
            average = result.average,
            "aggregated variances"
        );
        result
    }
}

async fn sample_for_date(
    source: &dyn MarketDataSource,
    resolver: &TradingDayResolver,
    symbol: &Symbol,
    report_date: ReportDate,
    timing: ReportTiming,
    method: VarianceMethod,
) -> Result<VarianceSample, SampleError> {
    let request = resolver.resolve(symbol, report_date, timing).await?;
    let bars = source.price_window(&request).await?;
    let percent = try_compute(method, &bars)?;
    Ok(VarianceSample {
        report_date,
        percent,
    })
}

impl std::fmt::Debug for ConcurrentAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentAggregator")
            .field("resolver", &self.resolver)
            .field("method", &self.method)
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}
