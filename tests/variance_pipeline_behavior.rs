//! Behavior-driven tests for trading-day resolution, aggregation and the
//! calendar scan.
//!
//! Every upstream call goes through a scripted transport, so each test
//! states the exact Nasdaq payloads it relies on.

mod support;

use std::sync::Arc;

use earnvar_core::{
    DuplicatePolicy, MarketDataSource, NamedList, PipelineConfig, PipelineError, ReportTiming,
    ResolveError, Symbol, TradingDayResolver, VariancePipeline, Watchlist,
};
use serde_json::json;
use support::{
    calendar_json, calendar_url, historical_url, surprise_json, surprise_url, trades_json,
    ScriptedHttpClient,
};
use time::macros::date;

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn source(client: &Arc<ScriptedHttpClient>) -> Arc<dyn MarketDataSource> {
    Arc::new(support::nasdaq(client))
}

fn pipeline(client: &Arc<ScriptedHttpClient>) -> VariancePipeline {
    pipeline_with(client, PipelineConfig::default())
}

fn pipeline_with(client: &Arc<ScriptedHttpClient>, config: PipelineConfig) -> VariancePipeline {
    VariancePipeline::new(
        source(client),
        PipelineConfig {
            workers: 4,
            ..config
        },
    )
}

fn sorted_percents(result: &earnvar_core::SymbolVarianceResult) -> Vec<i64> {
    let mut percents: Vec<i64> = result.percents().collect();
    percents.sort_unstable();
    percents
}

// =============================================================================
// Aggregation: After-Hours Reports
// =============================================================================

#[tokio::test]
async fn after_hours_report_measures_the_next_two_trading_days() {
    // Given: ABC reported after hours on 2024-03-01
    let client = ScriptedHttpClient::new();
    client.respond_json(surprise_url("ABC"), surprise_json(&["03/01/2024"]));
    client.respond_json(
        historical_url("ABC", "2024-03-02"),
        trades_json(&[
            ("03/05/2024", "$11.50", "$12.00"),
            ("03/04/2024", "$9.80", "$10.00"),
        ]),
    );
    let pipeline = pipeline(&client);

    // When: The symbol is analyzed
    let result = pipeline
        .analyze_symbol(&symbol("ABC"), ReportTiming::AfterHours)
        .await;

    // Then: The move from $10.00 to $12.00 is a 20% sample
    assert_eq!(sorted_percents(&result), vec![20]);
    assert_eq!(result.average, 20);
    assert_eq!(result.samples[0].report_date, date!(2024 - 03 - 01));
    assert!(pipeline.is_significant(&result));
}

#[tokio::test]
async fn average_is_the_truncated_mean_of_all_samples() {
    // Given: Two report dates moving 2% and 8%
    let client = ScriptedHttpClient::new();
    client.respond_json(surprise_url("ABC"), surprise_json(&["1/30/2024", "10/26/2023"]));
    client.respond_json(
        historical_url("ABC", "2024-01-31"),
        trades_json(&[
            ("02/01/2024", "$101.00", "$102.00"),
            ("01/31/2024", "$99.00", "$100.00"),
        ]),
    );
    client.respond_json(
        historical_url("ABC", "2023-10-27"),
        trades_json(&[
            ("10/30/2023", "$53.00", "$54.00"),
            ("10/27/2023", "$49.00", "$50.00"),
        ]),
    );

    // When: The symbol is analyzed
    let result = pipeline(&client)
        .analyze_symbol(&symbol("ABC"), ReportTiming::Unspecified)
        .await;

    // Then: Both samples are kept and the mean is 5
    assert_eq!(sorted_percents(&result), vec![2, 8]);
    assert_eq!(result.average, 5);
}

#[tokio::test]
async fn zero_anchor_price_contributes_no_sample() {
    let client = ScriptedHttpClient::new();
    client.respond_json(surprise_url("ABC"), surprise_json(&["03/01/2024"]));
    client.respond_json(
        historical_url("ABC", "2024-03-02"),
        trades_json(&[
            ("03/05/2024", "$1.00", "$1.00"),
            ("03/04/2024", "$0.00", "$0.00"),
        ]),
    );
    let pipeline = pipeline(&client);

    let result = pipeline
        .analyze_symbol(&symbol("ABC"), ReportTiming::AfterHours)
        .await;

    assert!(result.samples.is_empty());
    assert_eq!(result.average, 0);
    assert!(!pipeline.is_significant(&result));
}

#[tokio::test]
async fn placeholder_price_in_an_unused_row_keeps_the_sample() {
    // Given: A window whose third trading day carries a placeholder open
    let client = ScriptedHttpClient::new();
    client.respond_json(surprise_url("ABC"), surprise_json(&["03/01/2024"]));
    client.respond_json(
        historical_url("ABC", "2024-03-02"),
        trades_json(&[
            ("03/07/2024", "N/A", "$13.00"),
            ("03/05/2024", "$11.50", "$12.00"),
            ("03/04/2024", "$9.80", "$10.00"),
        ]),
    );

    // When: The symbol is analyzed
    let result = pipeline(&client)
        .analyze_symbol(&symbol("ABC"), ReportTiming::AfterHours)
        .await;

    // Then: The anchor and following closes still produce the 20% sample
    assert_eq!(sorted_percents(&result), vec![20]);
    assert_eq!(result.average, 20);
}

#[tokio::test]
async fn placeholder_anchor_close_drops_only_that_date() {
    let client = ScriptedHttpClient::new();
    client.respond_json(surprise_url("ABC"), surprise_json(&["03/01/2024"]));
    client.respond_json(
        historical_url("ABC", "2024-03-02"),
        trades_json(&[
            ("03/05/2024", "$11.50", "$12.00"),
            ("03/04/2024", "$9.80", "N/A"),
        ]),
    );

    let result = pipeline(&client)
        .analyze_symbol(&symbol("ABC"), ReportTiming::AfterHours)
        .await;

    assert!(result.samples.is_empty());
}

#[tokio::test]
async fn pre_market_walk_back_tolerates_placeholder_prices() {
    let client = ScriptedHttpClient::new();
    client.respond_json(surprise_url("ABC"), surprise_json(&["03/09/2024"]));
    client.respond_json(
        historical_url("ABC", "2024-03-08"),
        trades_json(&[
            ("03/12/2024", "N/A", "N/A"),
            ("03/11/2024", "$10.50", "$11.00"),
            ("03/08/2024", "N/A", "$10.00"),
        ]),
    );

    let result = pipeline(&client)
        .analyze_symbol(&symbol("ABC"), ReportTiming::PreMarket)
        .await;

    assert_eq!(sorted_percents(&result), vec![10]);
}

#[tokio::test]
async fn a_failing_report_date_does_not_sink_its_siblings() {
    // Given: One window answers 500 while the other is healthy
    let client = ScriptedHttpClient::new();
    client.respond_json(surprise_url("ABC"), surprise_json(&["03/01/2024", "12/01/2023"]));
    client.respond_json(
        historical_url("ABC", "2024-03-02"),
        trades_json(&[
            ("03/05/2024", "$11.50", "$12.00"),
            ("03/04/2024", "$9.80", "$10.00"),
        ]),
    );
    client.respond(historical_url("ABC", "2023-12-02"), 500, "upstream down");

    // When: The symbol is analyzed
    let result = pipeline(&client)
        .analyze_symbol(&symbol("ABC"), ReportTiming::AfterHours)
        .await;

    // Then: Only the healthy date produced a sample
    assert_eq!(sorted_percents(&result), vec![20]);
    assert_eq!(result.samples[0].report_date, date!(2024 - 03 - 01));
}

#[tokio::test]
async fn unavailable_report_history_yields_an_empty_result() {
    let client = ScriptedHttpClient::new();
    client.respond(surprise_url("ABC"), 500, "");

    let result = pipeline(&client)
        .analyze_symbol(&symbol("ABC"), ReportTiming::AfterHours)
        .await;

    assert!(result.samples.is_empty());
    assert_eq!(result.average, 0);
    assert_eq!(client.calls_to(&historical_url("ABC", "2024-03-02")), 0);
}

#[tokio::test]
async fn repeated_analysis_gives_the_same_samples() {
    let client = ScriptedHttpClient::new();
    client.respond_json(surprise_url("ABC"), surprise_json(&["1/30/2024", "10/26/2023"]));
    client.respond_json(
        historical_url("ABC", "2024-01-31"),
        trades_json(&[
            ("02/01/2024", "$101.00", "$102.00"),
            ("01/31/2024", "$99.00", "$100.00"),
        ]),
    );
    client.respond_json(
        historical_url("ABC", "2023-10-27"),
        trades_json(&[
            ("10/30/2023", "$53.00", "$54.00"),
            ("10/27/2023", "$49.00", "$50.00"),
        ]),
    );
    let pipeline = pipeline(&client);

    let first = pipeline
        .analyze_symbol(&symbol("ABC"), ReportTiming::AfterHours)
        .await;
    let second = pipeline
        .analyze_symbol(&symbol("ABC"), ReportTiming::AfterHours)
        .await;

    assert_eq!(sorted_percents(&first), sorted_percents(&second));
    assert_eq!(first.average, second.average);
}

// =============================================================================
// Aggregation: Duplicate Report Dates
// =============================================================================

#[tokio::test]
async fn duplicate_report_dates_are_counted_twice_by_default() {
    let client = ScriptedHttpClient::new();
    client.respond_json(surprise_url("ABC"), surprise_json(&["03/01/2024", "03/01/2024"]));
    client.respond_json(
        historical_url("ABC", "2024-03-02"),
        trades_json(&[
            ("03/05/2024", "$11.50", "$12.00"),
            ("03/04/2024", "$9.80", "$10.00"),
        ]),
    );

    let keep = pipeline(&client)
        .analyze_symbol(&symbol("ABC"), ReportTiming::AfterHours)
        .await;
    let dedupe = pipeline_with(
        &client,
        PipelineConfig {
            duplicate_policy: DuplicatePolicy::Dedupe,
            ..PipelineConfig::default()
        },
    )
    .analyze_symbol(&symbol("ABC"), ReportTiming::AfterHours)
    .await;

    assert_eq!(sorted_percents(&keep), vec![20, 20]);
    assert_eq!(sorted_percents(&dedupe), vec![20]);
}

// =============================================================================
// Resolution: Pre-Market Reports
// =============================================================================

#[tokio::test]
async fn pre_market_report_starts_on_the_previous_trading_day() {
    // Given: A pre-market report on Saturday 2024-03-09 whose previous day traded
    let client = ScriptedHttpClient::new();
    client.respond_json(
        historical_url("ABC", "2024-03-08"),
        trades_json(&[
            ("03/11/2024", "$10.50", "$11.00"),
            ("03/08/2024", "$9.90", "$10.00"),
        ]),
    );
    let resolver = TradingDayResolver::new(source(&client));

    // When: The window is resolved
    let request = resolver
        .resolve(&symbol("ABC"), date!(2024 - 03 - 09), ReportTiming::PreMarket)
        .await
        .expect("previous day traded");

    // Then: The window begins on the anchor day
    assert_eq!(request.start, date!(2024 - 03 - 08));
    assert_eq!(request.limit, 365);
}

#[tokio::test]
async fn pre_market_monday_report_walks_back_over_the_weekend() {
    // Given: Weekend probes only see bars from the report day onwards
    let client = ScriptedHttpClient::new();
    let from_monday = trades_json(&[
        ("03/12/2024", "$12.00", "$12.50"),
        ("03/11/2024", "$11.00", "$12.00"),
    ]);
    client.respond_json(historical_url("ABC", "2024-03-10"), from_monday.clone());
    client.respond_json(historical_url("ABC", "2024-03-09"), from_monday);
    client.respond_json(
        historical_url("ABC", "2024-03-08"),
        trades_json(&[
            ("03/12/2024", "$12.00", "$12.50"),
            ("03/11/2024", "$11.00", "$12.00"),
            ("03/08/2024", "$9.90", "$10.00"),
        ]),
    );
    client.respond_json(surprise_url("ABC"), surprise_json(&["03/11/2024"]));

    // When: The symbol is analyzed as a pre-market reporter
    let result = pipeline(&client)
        .analyze_symbol(&symbol("ABC"), ReportTiming::PreMarket)
        .await;

    // Then: Friday's close anchors the move into Monday
    assert_eq!(sorted_percents(&result), vec![20]);
    assert_eq!(client.calls_to(&historical_url("ABC", "2024-03-10")), 1);
    assert_eq!(client.calls_to(&historical_url("ABC", "2024-03-09")), 1);
}

#[tokio::test]
async fn pre_market_walk_back_gives_up_after_the_lookback_limit() {
    // Given: No window is available for any candidate day
    let client = ScriptedHttpClient::new();
    let resolver = TradingDayResolver::new(source(&client)).with_max_lookback_days(3);

    // When: The window is resolved
    let error = resolver
        .resolve(&symbol("ABC"), date!(2024 - 03 - 09), ReportTiming::PreMarket)
        .await
        .expect_err("nothing to find");

    // Then: Exactly three candidate days were probed
    assert_eq!(
        error,
        ResolveError::NoTradingDayFound {
            symbol: symbol("ABC"),
            report_date: date!(2024 - 03 - 09),
            lookback_days: 3,
        }
    );
    assert_eq!(client.requests().len(), 3);
    assert_eq!(client.calls_to(&historical_url("ABC", "2024-03-06")), 1);
    assert_eq!(client.calls_to(&historical_url("ABC", "2024-03-05")), 0);
}

// =============================================================================
// Calendar Scan
// =============================================================================

#[tokio::test]
async fn scan_keeps_significant_watched_symbols_with_their_platforms() {
    // Given: A calendar with a watched mover, a watched quiet name and an unwatched name
    let client = ScriptedHttpClient::new();
    client.respond_json(
        calendar_url("2024-03-08"),
        calendar_json(&[
            ("ZED", "time-after-hours"),
            ("ABC", "time-after-hours"),
            ("OFF", "time-after-hours"),
            ("NOP", "time-not-supplied"),
        ]),
    );
    client.respond_json(surprise_url("ABC"), surprise_json(&["03/01/2024"]));
    client.respond_json(
        historical_url("ABC", "2024-03-02"),
        trades_json(&[
            ("03/05/2024", "$11.50", "$12.00"),
            ("03/04/2024", "$9.80", "$10.00"),
        ]),
    );
    client.respond_json(surprise_url("ZED"), surprise_json(&["03/01/2024"]));
    client.respond_json(
        historical_url("ZED", "2024-03-02"),
        trades_json(&[
            ("03/05/2024", "$51.00", "$51.00"),
            ("03/04/2024", "$50.00", "$50.00"),
        ]),
    );
    let watchlist = Watchlist::new(vec![
        NamedList::from_lines("Moneta", "ABC\nZED\n"),
        NamedList::from_lines("IQ Option", "# brokers\nabc\n"),
    ]);

    // When: The calendar day is scanned
    let report = pipeline(&client)
        .with_watchlist(watchlist)
        .run(date!(2024 - 03 - 08))
        .await
        .expect("calendar available");

    // Then: Only ABC is retained and both platforms are attached
    assert_eq!(report.calendar_rows, 3);
    assert_eq!(report.watched, 2);
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].result.symbol, symbol("ABC"));
    assert_eq!(
        report.entries[0].platforms,
        vec![String::from("Moneta"), String::from("IQ Option")]
    );
    assert_eq!(client.calls_to(&surprise_url("OFF")), 0);
}

#[tokio::test]
async fn unrestricted_scan_orders_entries_by_symbol() {
    let client = ScriptedHttpClient::new();
    client.respond_json(
        calendar_url("2024-03-08"),
        calendar_json(&[("ZED", "time-pre-market"), ("ABC", "time-after-hours")]),
    );
    client.respond_json(surprise_url("ABC"), surprise_json(&["03/01/2024"]));
    client.respond_json(surprise_url("ZED"), surprise_json(&["03/01/2024"]));
    let window = trades_json(&[
        ("03/05/2024", "$11.50", "$12.00"),
        ("03/04/2024", "$9.80", "$10.00"),
    ]);
    client.respond_json(historical_url("ABC", "2024-03-02"), window.clone());
    client.respond_json(
        historical_url("ZED", "2024-02-29"),
        trades_json(&[
            ("03/01/2024", "$11.50", "$12.00"),
            ("02/29/2024", "$9.80", "$10.00"),
        ]),
    );

    let report = pipeline(&client)
        .run(date!(2024 - 03 - 08))
        .await
        .expect("calendar available");

    let symbols: Vec<&str> = report
        .entries
        .iter()
        .map(|entry| entry.result.symbol.as_str())
        .collect();
    assert_eq!(symbols, vec!["ABC", "ZED"]);
    assert!(report.entries.iter().all(|entry| entry.platforms.is_empty()));
}

#[tokio::test]
async fn missing_calendar_is_reported_as_unavailable() {
    let client = ScriptedHttpClient::new();
    client.respond_json(calendar_url("2024-03-09"), json!({ "data": null }));

    let error = pipeline(&client)
        .run(date!(2024 - 03 - 09))
        .await
        .expect_err("weekend calendar is empty");

    assert!(matches!(
        error,
        PipelineError::CalendarUnavailable { date } if date == date!(2024 - 03 - 09)
    ));
}

#[tokio::test]
async fn calendar_fetch_failure_is_surfaced() {
    let client = ScriptedHttpClient::new();
    client.respond(calendar_url("2024-03-08"), 503, "");

    let error = pipeline(&client)
        .run(date!(2024 - 03 - 08))
        .await
        .expect_err("calendar fetch failed");

    assert!(matches!(error, PipelineError::Calendar(_)));
}
