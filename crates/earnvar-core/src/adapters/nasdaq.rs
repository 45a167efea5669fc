use std::future::Future;
use std::pin::Pin;

use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;
use tracing::{debug, warn};

use crate::data_source::{HistoricalWindowRequest, MarketDataSource};
use crate::fetch::{FetchError, Fetcher};
use crate::{
    format_iso_date, parse_price, parse_us_date, CalendarRow, PriceBar, ReportDate, ReportTiming,
    Symbol,
};

pub const DEFAULT_BASE_URL: &str = "https://api.nasdaq.com/api";

/// Nasdaq public API adapter for calendar, earnings-surprise and historical quotes.
#[derive(Debug, Clone)]
pub struct NasdaqSource {
    fetcher: Fetcher,
    base_url: String,
}

impl NasdaqSource {
    pub fn new(fetcher: Fetcher) -> Self {
        Self::with_base_url(fetcher, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(fetcher: Fetcher, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    pub fn calendar_url(&self, date: Date) -> String {
        format!(
            "{}/calendar/earnings?date={}",
            self.base_url,
            format_iso_date(date)
        )
    }

    pub fn earnings_surprise_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/company/{}/earnings-surprise",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        )
    }

    pub fn historical_url(&self, request: &HistoricalWindowRequest) -> String {
        format!(
            "{}/quote/{}/historical?assetclass=stocks&fromdate={}&limit={}",
            self.base_url,
            urlencoding::encode(request.symbol.as_str()),
            format_iso_date(request.start),
            request.limit
        )
    }

    async fn fetch_calendar(&self, date: Date) -> Result<Option<Vec<CalendarRow>>, FetchError> {
        let url = self.calendar_url(date);
        let payload: NasdaqEnvelope<CalendarData> = self.fetcher.fetch_json(&url).await?;

        let rows = match payload.data.and_then(|data| data.rows) {
            Some(rows) if !rows.is_empty() => rows,
            _ => return Ok(None),
        };

        let total = rows.len();
        let rows: Vec<CalendarRow> = rows
            .into_iter()
            .filter_map(|row| {
                let timing = ReportTiming::from_upstream(row.time.as_deref().unwrap_or_default())?;
                match Symbol::parse(&row.symbol) {
                    Ok(symbol) => Some(CalendarRow { symbol, timing }),
                    Err(error) => {
                        warn!(symbol = %row.symbol, %error, "skipping calendar row");
                        None
                    }
                }
            })
            .collect();

        debug!(date = %format_iso_date(date), total, kept = rows.len(), "parsed earnings calendar");
        Ok(Some(rows))
    }

    async fn fetch_report_dates(&self, symbol: &Symbol) -> Result<Vec<ReportDate>, FetchError> {
        let url = self.earnings_surprise_url(symbol);
        let payload: NasdaqEnvelope<EarningsSurpriseData> = self.fetcher.fetch_json(&url).await?;

        let rows = payload
            .data
            .and_then(|data| data.earnings_surprise_table)
            .and_then(|table| table.rows)
            .unwrap_or_default();

        Ok(rows
            .into_iter()
            .filter_map(|row| match parse_us_date(&row.date_reported) {
                Ok(date) => Some(date),
                Err(error) => {
                    warn!(%symbol, %error, "skipping unparsable report date");
                    None
                }
            })
            .collect())
    }

    async fn fetch_price_window(
        &self,
        request: &HistoricalWindowRequest,
    ) -> Result<Vec<PriceBar>, FetchError> {
        let url = self.historical_url(request);
        let payload: NasdaqEnvelope<HistoricalData> = self.fetcher.fetch_json(&url).await?;

        let rows = payload
            .data
            .and_then(|data| data.trades_table)
            .and_then(|table| table.rows)
            .unwrap_or_default();

        let mut bars: Vec<PriceBar> = rows.iter().filter_map(TradeRow::to_bar).collect();

        // Upstream lists newest first.
        bars.sort_by_key(|bar| bar.date);
        Ok(bars)
    }
}

impl MarketDataSource for NasdaqSource {
    fn calendar<'a>(
        &'a self,
        date: Date,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<CalendarRow>>, FetchError>> + Send + 'a>>
    {
        Box::pin(self.fetch_calendar(date))
    }

    fn report_dates<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ReportDate>, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch_report_dates(symbol))
    }

    fn price_window<'a>(
        &'a self,
        request: &'a HistoricalWindowRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PriceBar>, FetchError>> + Send + 'a>> {
        Box::pin(self.fetch_price_window(request))
    }
}

// ============================================================================
// Wire models
// ============================================================================

#[derive(Debug, Deserialize)]
struct NasdaqEnvelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct NasdaqTable<T> {
    rows: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct CalendarData {
    rows: Option<Vec<CalendarRowPayload>>,
}

#[derive(Debug, Deserialize)]
struct CalendarRowPayload {
    symbol: String,
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarningsSurpriseData {
    earnings_surprise_table: Option<NasdaqTable<EarningsSurpriseRow>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarningsSurpriseRow {
    date_reported: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoricalData {
    trades_table: Option<NasdaqTable<TradeRow>>,
}

#[derive(Debug, Deserialize)]
struct TradeRow {
    date: String,
    open: String,
    close: String,
}

impl TradeRow {
    /// Rows without a date are dropped; placeholder prices become `None` and
    /// only fail the calculation that reads them.
    fn to_bar(&self) -> Option<PriceBar> {
        let date = match parse_us_date(&self.date) {
            Ok(date) => date,
            Err(error) => {
                debug!(%error, "skipping trade row without a usable date");
                return None;
            }
        };
        Some(PriceBar::with_prices(
            date,
            lenient_price(date, "open", &self.open),
            lenient_price(date, "close", &self.close),
        ))
    }
}

fn lenient_price(date: Date, field: &'static str, raw: &str) -> Option<Decimal> {
    match parse_price(raw) {
        Ok(price) => Some(price),
        Err(error) => {
            debug!(date = %format_iso_date(date), field, %error, "placeholder price in trade row");
            None
        }
    }
}
