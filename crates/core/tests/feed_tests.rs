// ═══════════════════════════════════════════════════════════════════
// Feed Tests — tick classification, merge semantics, catalog, poller
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use paper_trader_core::models::quote::QuoteErrorReason;
use paper_trader_core::providers::catalog::InstrumentCatalog;
use paper_trader_core::providers::traits::{QuoteSource, RawQuote, SourceFailure};
use paper_trader_core::services::feed_service::{tracked_symbols, FeedService};
use paper_trader_core::services::poller::FeedPoller;

// ═══════════════════════════════════════════════════════════════════
// Mock Source
// ═══════════════════════════════════════════════════════════════════

/// Scriptable quote source: per-id prices, an injectable whole-request
/// failure, and a record of every batch of ids requested.
#[derive(Clone, Default)]
struct MockQuoteSource {
    prices: Arc<Mutex<HashMap<String, f64>>>,
    failure: Arc<Mutex<Option<SourceFailure>>>,
    requests: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockQuoteSource {
    fn new() -> Self {
        Self::default()
    }

    fn set_price(&self, id: &str, price: f64) {
        self.prices.lock().unwrap().insert(id.to_string(), price);
    }

    fn remove_price(&self, id: &str) {
        self.prices.lock().unwrap().remove(id);
    }

    fn fail_with(&self, failure: Option<SourceFailure>) {
        *self.failure.lock().unwrap() = failure;
    }

    fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    fn name(&self) -> &str {
        "MockSource"
    }

    async fn fetch_quotes(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, RawQuote>, SourceFailure> {
        self.requests.lock().unwrap().push(ids.to_vec());

        if let Some(failure) = self.failure.lock().unwrap().clone() {
            return Err(failure);
        }

        let prices = self.prices.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| {
                prices.get(id).map(|&usd| {
                    (
                        id.clone(),
                        RawQuote {
                            usd,
                            usd_24h_change: 1.5,
                        },
                    )
                })
            })
            .collect())
    }
}

fn feed_with(source: MockQuoteSource) -> FeedService {
    FeedService::new(Box::new(source), InstrumentCatalog::new_with_defaults())
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════
// Tick Classification
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn successful_tick_yields_tradeable_quotes() {
    let source = MockQuoteSource::new();
    source.set_price("bitcoin", 50_000.0);
    source.set_price("ethereum", 2_000.0);
    let mut feed = feed_with(source);

    let snapshot = feed.tick(&symbols(&["BTC", "ETH"])).await;

    assert_eq!(snapshot.quotes.len(), 2);
    assert!(snapshot.is_tradeable("BTC"));
    assert_eq!(snapshot.quote("BTC").unwrap().price, 50_000.0);
    assert_eq!(snapshot.quote("BTC").unwrap().change_percent_24h, 1.5);
    assert!(snapshot.errors.is_empty());
}

#[tokio::test]
async fn partial_response_marks_only_the_missing_symbol() {
    let source = MockQuoteSource::new();
    source.set_price("bitcoin", 50_000.0);
    source.set_price("ethereum", 2_000.0);
    // no "solana" price
    let mut feed = feed_with(source);

    let snapshot = feed.tick(&symbols(&["BTC", "ETH", "SOL"])).await;

    assert_eq!(snapshot.quotes.len(), 2);
    assert_eq!(snapshot.errors.len(), 1);
    assert_eq!(
        snapshot.errors["SOL"].reason,
        QuoteErrorReason::DataUnavailable
    );
    assert!(snapshot.is_tradeable("BTC"));
    assert!(snapshot.is_tradeable("ETH"));
}

#[tokio::test]
async fn network_failure_marks_every_requested_symbol() {
    let source = MockQuoteSource::new();
    source.fail_with(Some(SourceFailure::Network("connection refused".into())));
    let mut feed = feed_with(source);

    let snapshot = feed.tick(&symbols(&["BTC", "ETH"])).await;

    assert_eq!(snapshot.errors.len(), 2);
    for symbol in ["BTC", "ETH"] {
        assert_eq!(snapshot.errors[symbol].reason, QuoteErrorReason::NetworkError);
    }
}

#[tokio::test]
async fn api_failure_marks_every_requested_symbol() {
    let source = MockQuoteSource::new();
    source.fail_with(Some(SourceFailure::Api {
        status: 429,
        message: "rate limited".into(),
    }));
    let mut feed = feed_with(source);

    let snapshot = feed.tick(&symbols(&["BTC", "ETH"])).await;

    assert_eq!(snapshot.errors.len(), 2);
    for symbol in ["BTC", "ETH"] {
        assert_eq!(snapshot.errors[symbol].reason, QuoteErrorReason::ApiError);
    }
}

#[tokio::test]
async fn non_positive_price_counts_as_data_unavailable() {
    let source = MockQuoteSource::new();
    source.set_price("bitcoin", 0.0);
    source.set_price("ethereum", -5.0);
    let mut feed = feed_with(source);

    let snapshot = feed.tick(&symbols(&["BTC", "ETH"])).await;

    assert!(snapshot.quotes.is_empty());
    assert_eq!(snapshot.errors.len(), 2);
    assert_eq!(
        snapshot.errors["BTC"].reason,
        QuoteErrorReason::DataUnavailable
    );
}

// ═══════════════════════════════════════════════════════════════════
// Merge Semantics
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn failing_symbol_keeps_its_stale_price_but_loses_tradeability() {
    let source = MockQuoteSource::new();
    source.set_price("bitcoin", 50_000.0);
    let mut feed = feed_with(source.clone());

    feed.tick(&symbols(&["BTC"])).await;
    assert!(feed.snapshot().is_tradeable("BTC"));

    source.remove_price("bitcoin");
    let snapshot = feed.tick(&symbols(&["BTC"])).await;

    // Stale price remains visible for display, but trading is off
    let quote = snapshot.quote("BTC").unwrap();
    assert_eq!(quote.price, 50_000.0);
    assert!(!quote.tradeable);
    assert_eq!(
        snapshot.errors["BTC"].reason,
        QuoteErrorReason::DataUnavailable
    );
}

#[tokio::test]
async fn a_fresh_success_clears_the_symbols_error() {
    let source = MockQuoteSource::new();
    source.fail_with(Some(SourceFailure::Network("timeout".into())));
    let mut feed = feed_with(source.clone());

    feed.tick(&symbols(&["BTC"])).await;
    assert_eq!(feed.snapshot().errors.len(), 1);

    source.fail_with(None);
    source.set_price("bitcoin", 51_000.0);
    let snapshot = feed.tick(&symbols(&["BTC"])).await;

    assert!(snapshot.errors.is_empty());
    assert!(snapshot.is_tradeable("BTC"));
    assert_eq!(snapshot.quote("BTC").unwrap().price, 51_000.0);
}

#[tokio::test]
async fn one_symbols_failure_never_blocks_anothers_success() {
    let source = MockQuoteSource::new();
    source.set_price("bitcoin", 50_000.0);
    source.set_price("ethereum", 2_000.0);
    let mut feed = feed_with(source.clone());
    feed.tick(&symbols(&["BTC", "ETH"])).await;

    source.remove_price("ethereum");
    source.set_price("bitcoin", 52_000.0);
    let snapshot = feed.tick(&symbols(&["BTC", "ETH"])).await;

    assert!(snapshot.is_tradeable("BTC"));
    assert_eq!(snapshot.quote("BTC").unwrap().price, 52_000.0);
    assert!(!snapshot.is_tradeable("ETH"));
    assert_eq!(snapshot.quote("ETH").unwrap().price, 2_000.0);
}

#[tokio::test]
async fn a_symbol_dropped_from_the_tracked_set_loses_tradeability() {
    let source = MockQuoteSource::new();
    source.set_price("bitcoin", 50_000.0);
    source.set_price("cosmos", 9.0);
    let mut feed = feed_with(source.clone());

    feed.tick(&symbols(&["BTC", "ATOM"])).await;
    assert!(feed.snapshot().is_tradeable("ATOM"));

    // ATOM leaves the tracked set; further ticks never request it
    feed.tick(&symbols(&["BTC"])).await;
    let snapshot = feed.tick(&symbols(&["BTC"])).await;

    let quote = snapshot.quote("ATOM").unwrap();
    assert_eq!(quote.price, 9.0); // stale price stays on display
    assert!(!quote.tradeable);
    assert!(!snapshot.errors.contains_key("ATOM"));
    assert!(snapshot.is_tradeable("BTC"));
}

// ═══════════════════════════════════════════════════════════════════
// Catalog & Batching
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn symbols_outside_the_catalog_are_never_queried() {
    let source = MockQuoteSource::new();
    source.set_price("bitcoin", 50_000.0);
    let mut feed = feed_with(source.clone());

    let snapshot = feed.tick(&symbols(&["BTC", "NOTREAL"])).await;

    let requests = source.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0], vec!["bitcoin".to_string()]);
    assert!(snapshot.quote("NOTREAL").is_none());
    assert!(!snapshot.errors.contains_key("NOTREAL"));
}

#[tokio::test]
async fn a_tick_issues_exactly_one_batched_request() {
    let source = MockQuoteSource::new();
    source.set_price("bitcoin", 50_000.0);
    source.set_price("ethereum", 2_000.0);
    source.set_price("solana", 150.0);
    let mut feed = feed_with(source.clone());

    feed.tick(&symbols(&["BTC", "ETH", "SOL"])).await;

    let requests = source.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].len(), 3);
}

#[tokio::test]
async fn duplicate_symbols_are_requested_once() {
    let source = MockQuoteSource::new();
    source.set_price("bitcoin", 50_000.0);
    let mut feed = feed_with(source.clone());

    feed.tick(&symbols(&["BTC", "btc", "BTC"])).await;

    assert_eq!(source.requests()[0], vec!["bitcoin".to_string()]);
}

#[tokio::test]
async fn an_empty_tracked_set_skips_the_source_entirely() {
    let source = MockQuoteSource::new();
    let mut feed = feed_with(source.clone());

    let snapshot = feed.tick(&symbols(&["NOTREAL"])).await;

    assert!(source.requests().is_empty());
    assert!(snapshot.quotes.is_empty());
    assert!(snapshot.errors.is_empty());
}

#[test]
fn tracked_symbols_unions_and_dedupes() {
    let held = symbols(&["BTC", "ETH"]);
    let watchlist = symbols(&["eth", "SOL"]);

    let tracked = tracked_symbols(&held, &watchlist, Some("doge"));

    assert_eq!(tracked, symbols(&["BTC", "ETH", "SOL", "DOGE"]));
}

// ═══════════════════════════════════════════════════════════════════
// Poller
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn poller_fires_ticks_until_stopped() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();

    let mut poller = FeedPoller::new();
    poller.start(Duration::from_millis(10), move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    assert!(poller.is_running());

    tokio::time::sleep(Duration::from_millis(55)).await;
    poller.stop();
    assert!(!poller.is_running());

    let fired = ticks.load(Ordering::SeqCst);
    assert!(fired >= 2, "expected several ticks, got {fired}");

    // No further ticks after cancellation
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), fired);
}

#[tokio::test]
async fn poller_never_overlaps_ticks() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let overlapped = Arc::new(AtomicUsize::new(0));
    let (in_flight_c, overlapped_c) = (in_flight.clone(), overlapped.clone());

    let mut poller = FeedPoller::new();
    // Each tick takes much longer than the interval
    poller.start(Duration::from_millis(5), move || {
        let in_flight = in_flight_c.clone();
        let overlapped = overlapped_c.clone();
        async move {
            if in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
                overlapped.fetch_add(1, Ordering::SeqCst);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    poller.stop();

    assert_eq!(overlapped.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dropping_the_poller_cancels_it() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();

    {
        let mut poller = FeedPoller::new();
        poller.start(Duration::from_millis(10), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        tokio::time::sleep(Duration::from_millis(25)).await;
    } // dropped here

    let at_drop = ticks.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), at_drop);
}
