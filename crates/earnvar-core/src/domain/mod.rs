//! # Domain Models
//!
//! Types flowing through the variance pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker |
//! | [`ReportTiming`] | When earnings were released relative to market hours |
//! | [`CalendarRow`] | One row of the daily earnings calendar |
//! | [`ReportDate`] | Day on which a company reported historically |
//! | [`PriceBar`] | Daily open/close for one trading day |
//! | [`VarianceSample`] | Move attributed to one report date |
//! | [`SymbolVarianceResult`] | All samples of a symbol and their mean |
//!
//! Upstream text is normalized at the edge: [`parse_us_date`] and
//! [`parse_price`] turn `"03/08/2024"` and `"$1,234.56"` into `Date` and
//! `Decimal` values before any arithmetic happens.

mod dates;
mod models;
mod price;
mod symbol;

pub use dates::{format_iso_date, parse_iso_date, parse_us_date, ReportDate};
pub use models::{CalendarRow, PriceBar, ReportTiming, SymbolVarianceResult, VarianceSample};
pub use price::parse_price;
pub use symbol::Symbol;
