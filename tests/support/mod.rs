//! Scripted transport and Nasdaq payload builders shared by the behavior tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use earnvar_core::{
    FetchConfig, Fetcher, HttpClient, HttpError, HttpRequest, HttpResponse, NasdaqSource,
    RetryConfig,
};
use serde_json::json;

pub const BASE_URL: &str = "https://nasdaq.test/api";

type Scripted = Result<HttpResponse, HttpError>;

/// Replays canned responses per URL. The last response of a queue repeats;
/// unknown URLs answer 404.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.push(url.into(), Ok(HttpResponse::new(status, body)));
    }

    pub fn respond_json(&self, url: impl Into<String>, body: serde_json::Value) {
        self.respond(url, 200, body.to_string());
    }

    pub fn fail(&self, url: impl Into<String>, error: HttpError) {
        self.push(url.into(), Err(error));
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|request| request.url == url)
            .count()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn push(&self, url: String, response: Scripted) {
        self.routes
            .lock()
            .expect("routes lock")
            .entry(url)
            .or_default()
            .push_back(response);
    }

    fn next(&self, url: &str) -> Scripted {
        let mut routes = self.routes.lock().expect("routes lock");
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().expect("non-empty queue"),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::new(404, ""))),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.next(&request.url);
            self.calls.lock().expect("calls lock").push(request);
            response
        })
    }
}

/// Same policy as production but with millisecond backoff.
pub fn fast_fetch_config() -> FetchConfig {
    FetchConfig {
        retry: RetryConfig::fixed(Duration::from_millis(1), 7),
        ..FetchConfig::default()
    }
}

pub fn fetcher(client: &Arc<ScriptedHttpClient>) -> Fetcher {
    Fetcher::new(client.clone(), fast_fetch_config())
}

pub fn nasdaq(client: &Arc<ScriptedHttpClient>) -> NasdaqSource {
    NasdaqSource::with_base_url(fetcher(client), BASE_URL)
}

pub fn calendar_url(iso_date: &str) -> String {
    format!("{BASE_URL}/calendar/earnings?date={iso_date}")
}

pub fn surprise_url(symbol: &str) -> String {
    format!("{BASE_URL}/company/{symbol}/earnings-surprise")
}

pub fn historical_url(symbol: &str, iso_start: &str) -> String {
    format!("{BASE_URL}/quote/{symbol}/historical?assetclass=stocks&fromdate={iso_start}&limit=365")
}

/// `(symbol, time)` rows.
pub fn calendar_json(rows: &[(&str, &str)]) -> serde_json::Value {
    let rows: Vec<_> = rows
        .iter()
        .map(|(symbol, time)| json!({ "symbol": symbol, "time": time, "name": "Test Corp" }))
        .collect();
    json!({ "data": { "asOf": "Fri, Mar 8, 2024", "rows": rows }, "status": { "rCode": 200 } })
}

pub fn surprise_json(dates: &[&str]) -> serde_json::Value {
    let rows: Vec<_> = dates
        .iter()
        .map(|date| json!({ "fiscalQtrEnding": "Dec 2023", "dateReported": date, "eps": 1.2 }))
        .collect();
    json!({ "data": { "earningsSurpriseTable": { "rows": rows } } })
}

/// `(date, open, close)` rows, given newest first as the upstream does.
pub fn trades_json(rows: &[(&str, &str, &str)]) -> serde_json::Value {
    let rows: Vec<_> = rows
        .iter()
        .map(|(date, open, close)| {
            json!({
                "date": date,
                "open": open,
                "close": close,
                "high": close,
                "low": open,
                "volume": "1,000,000"
            })
        })
        .collect();
    json!({ "data": { "symbol": "TEST", "tradesTable": { "rows": rows } } })
}
