use chrono::Utc;

use crate::models::quote::{FeedSnapshot, Quote, QuoteError, QuoteErrorReason};
use crate::providers::catalog::InstrumentCatalog;
use crate::providers::traits::{QuoteSource, SourceFailure};

/// Polls the external quote source and maintains the merged feed state.
///
/// Failure handling is three-tier:
/// - transport failure → every requested symbol gets `NetworkError`
/// - non-success response → every requested symbol gets `ApiError`
/// - a symbol missing from an otherwise good response → `DataUnavailable`
///   for that symbol only
///
/// A failed symbol keeps its previously cached price for display but
/// becomes untradeable until a fresh success arrives, and a symbol the
/// current tick did not request at all (dropped from the tracked set)
/// loses tradeability the same way. One symbol's failure never blocks
/// another's success in the same tick, and a tick never returns an
/// error — it merges whatever succeeded into prior state.
pub struct FeedService {
    source: Box<dyn QuoteSource>,
    catalog: InstrumentCatalog,
    snapshot: FeedSnapshot,
}

impl FeedService {
    pub fn new(source: Box<dyn QuoteSource>, catalog: InstrumentCatalog) -> Self {
        Self {
            source,
            catalog,
            snapshot: FeedSnapshot::default(),
        }
    }

    /// One execution of the polling cycle for the given symbol set.
    ///
    /// Only catalog symbols are dispatched, in a single batched request;
    /// the rest are ignored entirely (they are always untradeable and
    /// never queried). Returns the merged snapshot after this cycle.
    pub async fn tick(&mut self, symbols: &[String]) -> FeedSnapshot {
        // Resolve requested symbols through the catalog, deduplicated
        let mut requested: Vec<(String, String)> = Vec::new();
        for symbol in symbols {
            let upper = symbol.to_uppercase();
            if requested.iter().any(|(s, _)| s == &upper) {
                continue;
            }
            if let Some(id) = self.catalog.external_id(&upper) {
                requested.push((upper, id.to_string()));
            }
        }

        // Tradeability belongs to the completing cycle alone: every
        // cached quote starts this tick stale, and only a fresh success
        // below turns it back on. A symbol that left the tracked set is
        // never refreshed, so its price carries forward display-only.
        for quote in self.snapshot.quotes.values_mut() {
            quote.tradeable = false;
        }

        if requested.is_empty() {
            return self.snapshot.clone();
        }

        let ids: Vec<String> = requested.iter().map(|(_, id)| id.clone()).collect();

        match self.source.fetch_quotes(&ids).await {
            Ok(raw) => {
                let observed_at = Utc::now();
                for (symbol, id) in &requested {
                    match raw.get(id) {
                        Some(r) if r.usd.is_finite() && r.usd > 0.0 => {
                            self.snapshot.quotes.insert(
                                symbol.clone(),
                                Quote {
                                    symbol: symbol.clone(),
                                    price: r.usd,
                                    change_percent_24h: r.usd_24h_change,
                                    observed_at,
                                    tradeable: true,
                                },
                            );
                            self.snapshot.errors.remove(symbol);
                        }
                        // Present but unusable prices count as missing data
                        _ => self.record_failure(symbol, QuoteErrorReason::DataUnavailable),
                    }
                }
                tracing::debug!(
                    requested = requested.len(),
                    errors = self.snapshot.errors.len(),
                    "feed tick complete"
                );
            }
            Err(failure) => {
                let reason = match &failure {
                    SourceFailure::Network(_) => QuoteErrorReason::NetworkError,
                    SourceFailure::Api { .. } => QuoteErrorReason::ApiError,
                };
                for (symbol, _) in &requested {
                    self.record_failure(symbol, reason);
                }
                match failure {
                    SourceFailure::Network(message) => {
                        tracing::warn!(source = self.source.name(), %message, "feed tick failed: network")
                    }
                    SourceFailure::Api { status, message } => {
                        tracing::warn!(source = self.source.name(), status, %message, "feed tick failed: API")
                    }
                }
            }
        }

        self.snapshot.clone()
    }

    /// The merged feed state: last known quotes (fresh or stale) plus
    /// outstanding per-symbol errors.
    #[must_use]
    pub fn snapshot(&self) -> &FeedSnapshot {
        &self.snapshot
    }

    /// The quote for a symbol, fresh or stale.
    #[must_use]
    pub fn quote(&self, symbol: &str) -> Option<&Quote> {
        self.snapshot.quote(symbol)
    }

    #[must_use]
    pub fn catalog(&self) -> &InstrumentCatalog {
        &self.catalog
    }

    /// Mark a symbol failed for this cycle: keep any stale price for
    /// display, flip tradeability off, record the reason.
    fn record_failure(&mut self, symbol: &str, reason: QuoteErrorReason) {
        if let Some(quote) = self.snapshot.quotes.get_mut(symbol) {
            quote.tradeable = false;
        }
        self.snapshot.errors.insert(
            symbol.to_string(),
            QuoteError {
                symbol: symbol.to_string(),
                reason,
            },
        );
    }
}

impl std::fmt::Debug for FeedService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedService")
            .field("source", &self.source.name())
            .field("quotes", &self.snapshot.quotes.len())
            .field("errors", &self.snapshot.errors.len())
            .finish()
    }
}

/// Build the tracked symbol set for a tick: held symbols ∪ the default
/// watchlist ∪ the currently selected symbol, deduplicated, order
/// preserved (holdings first).
#[must_use]
pub fn tracked_symbols(
    held: &[String],
    watchlist: &[String],
    selected: Option<&str>,
) -> Vec<String> {
    fn push(symbol: &str, tracked: &mut Vec<String>) {
        let upper = symbol.to_uppercase();
        if !tracked.contains(&upper) {
            tracked.push(upper);
        }
    }

    let mut tracked: Vec<String> = Vec::new();

    for symbol in held {
        push(symbol, &mut tracked);
    }
    for symbol in watchlist {
        push(symbol, &mut tracked);
    }
    if let Some(symbol) = selected {
        push(symbol, &mut tracked);
    }
    tracked
}
