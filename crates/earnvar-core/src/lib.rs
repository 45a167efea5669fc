//! # earnvar Core
//!
//! Post-earnings price variance pipeline.
//!
//! ## Overview
//!
//! Given the companies reporting earnings on a day, this crate looks up each
//! company's historical report dates, measures how far the stock moved
//! around every one of them, and keeps the companies whose moves crossed a
//! threshold.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Upstream adapters (Nasdaq) |
//! | [`aggregate`] | Concurrent per-date fan-out and reduction |
//! | [`config`] | Pipeline configuration |
//! | [`data_source`] | Source trait and window requests |
//! | [`domain`] | Domain models (Symbol, PriceBar, SymbolVarianceResult) |
//! | [`error`] | Validation errors |
//! | [`fetch`] | HTTP fetch unit with retry |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`pipeline`] | End-to-end scan driver |
//! | [`resolver`] | Trading-day resolution |
//! | [`retry`] | Retry and backoff policy |
//! | [`signal`] | Significance filter |
//! | [`variance`] | Variance calculation |
//! | [`watchlist`] | Ticker watch-lists |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use earnvar_core::{
//!     FetchConfig, Fetcher, NasdaqSource, PipelineConfig, ReqwestHttpClient, VariancePipeline,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = Fetcher::new(Arc::new(ReqwestHttpClient::new()), FetchConfig::default());
//!     let source = Arc::new(NasdaqSource::new(fetcher));
//!     let pipeline = VariancePipeline::new(source, PipelineConfig::default());
//!
//!     let report = pipeline.run(time::macros::date!(2024 - 03 - 08)).await?;
//!     for entry in &report.entries {
//!         println!("{}: {:?} ({})", entry.result.symbol, entry.result.samples, entry.result.average);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ VariancePipeline│── calendar ──▶ watch-list filter
//! └────────┬────────┘
//!          │ one symbol at a time
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Aggregator      │────▶│ Trading-Day      │
//! │ (task per date) │     │ Resolver         │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Variance        │◀────│ Fetcher          │
//! │ Calculator      │     │ (retry on 403)   │
//! └────────┬────────┘     └──────────────────┘
//!          ▼
//! ┌─────────────────┐
//! │ Signal Filter   │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Per-date failures never abort an aggregation; they are logged and the
//! date simply contributes no sample:
//!
//! ```rust
//! use earnvar_core::{FetchError, SampleError};
//!
//! fn describe(error: &SampleError) -> &'static str {
//!     match error {
//!         SampleError::Fetch(FetchError::RateLimitExhausted { .. }) => "rate limited",
//!         SampleError::Fetch(_) => "upstream failure",
//!         SampleError::Resolve(_) => "no trading day",
//!         SampleError::Variance(_) => "data gap",
//!         SampleError::PoolClosed => "shutting down",
//!     }
//! }
//! ```

pub mod adapters;
pub mod aggregate;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod pipeline;
pub mod resolver;
pub mod retry;
pub mod signal;
pub mod variance;
pub mod watchlist;

// Adapter implementations
pub use adapters::NasdaqSource;

// Aggregation
pub use aggregate::{ConcurrentAggregator, SampleError};

// Configuration
pub use config::{default_workers, DuplicatePolicy, PipelineConfig};

// Data source trait and types
pub use data_source::{HistoricalWindowRequest, MarketDataSource, DEFAULT_HISTORY_LIMIT};

// Domain models
pub use domain::{
    format_iso_date, parse_iso_date, parse_price, parse_us_date, CalendarRow, PriceBar,
    ReportDate, ReportTiming, Symbol, SymbolVarianceResult, VarianceSample,
};

// Error types
pub use error::ValidationError;

// Fetch unit
pub use fetch::{FetchConfig, FetchError, Fetcher, DEFAULT_USER_AGENT};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Pipeline driver
pub use pipeline::{PipelineError, ScanEntry, ScanReport, VariancePipeline};

// Trading-day resolution
pub use resolver::{ResolveError, TradingDayResolver, DEFAULT_MAX_LOOKBACK_DAYS};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Signal filter
pub use signal::{is_significant, SignalFilter, DEFAULT_THRESHOLD};

// Variance calculation
pub use variance::{compute, try_compute, VarianceError, VarianceMethod};

// Watch-lists
pub use watchlist::{NamedList, Watchlist, WatchlistError};
