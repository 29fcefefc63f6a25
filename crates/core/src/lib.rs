pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use errors::CoreError;
use models::{
    history::{HistoryPoint, PriceHistoryBuffer},
    portfolio::{PortfolioState, STARTING_CASH},
    profile::Profile,
    quote::{FeedSnapshot, Quote, QuoteError},
    transaction::{TradeKind, Transaction},
};
use providers::{catalog::InstrumentCatalog, traits::QuoteSource};
use services::{
    feed_service::{tracked_symbols, FeedService},
    ledger_service::LedgerService,
    poller::FeedPoller,
    sync_service::SyncService,
    valuation_service::{Valuation, ValuationService},
};
use storage::store::ProfileStore;

/// How often the feed polls the quote source.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Explicit configuration for the core — everything a shell would
/// otherwise reach for ambient state to decide.
#[derive(Debug, Clone)]
pub struct TraderConfig {
    /// Symbols always tracked by the feed, held or not
    pub watchlist: Vec<String>,

    /// Feed polling cadence
    pub poll_interval: Duration,

    /// Cash a fresh portfolio opens with; also what a reset restores
    /// and the baseline the all-time return is measured against
    pub starting_cash: f64,
}

impl Default for TraderConfig {
    fn default() -> Self {
        Self {
            watchlist: vec!["BTC".into(), "ETH".into(), "SOL".into(), "DOGE".into()],
            poll_interval: DEFAULT_POLL_INTERVAL,
            starting_cash: STARTING_CASH,
        }
    }
}

/// Main entry point for the paper trading core.
///
/// Owns the portfolio ledger state and all services that operate on it:
/// trade execution, the polled price feed, the bounded price history,
/// valuation, and profile persistence. Constructed from explicit
/// collaborators — no UI or ambient dependencies.
///
/// Exactly one ledger mutation can be in flight at a time (`&mut self`);
/// the feed and the ledger rendezvous only through immutable [`Quote`]
/// snapshots.
#[must_use]
pub struct PaperTrader {
    config: TraderConfig,
    state: PortfolioState,
    ledger: LedgerService,
    feed: FeedService,
    valuation: ValuationService,
    sync: SyncService,
    history: PriceHistoryBuffer,
    selected: Option<String>,
    last_persist_error: Option<CoreError>,
}

impl std::fmt::Debug for PaperTrader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperTrader")
            .field("cash", &self.state.cash)
            .field("holdings", &self.state.holdings.len())
            .field("transactions", &self.state.transactions.len())
            .field("feed", &self.feed)
            .finish()
    }
}

impl PaperTrader {
    /// Build the core from its collaborators with the default instrument
    /// catalog.
    pub fn new(
        store: Arc<dyn ProfileStore>,
        source: Box<dyn QuoteSource>,
        config: TraderConfig,
    ) -> Self {
        Self::with_catalog(store, source, config, InstrumentCatalog::new_with_defaults())
    }

    /// Build the core with an explicit instrument catalog.
    pub fn with_catalog(
        store: Arc<dyn ProfileStore>,
        source: Box<dyn QuoteSource>,
        config: TraderConfig,
        catalog: InstrumentCatalog,
    ) -> Self {
        let starting_cash = config.starting_cash;
        Self {
            config,
            state: PortfolioState::with_starting_cash(starting_cash),
            ledger: LedgerService::new(),
            feed: FeedService::new(source, catalog),
            valuation: ValuationService::with_starting_cash(starting_cash),
            sync: SyncService::new(store),
            history: PriceHistoryBuffer::new(),
            selected: None,
            last_persist_error: None,
        }
    }

    // ── Identity ────────────────────────────────────────────────────

    /// Create and store a new user, switch to them, and start them with
    /// a fresh portfolio.
    pub async fn sign_up(
        &mut self,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Result<Profile, CoreError> {
        let profile = self
            .sync
            .sign_up(username, credential, self.config.starting_cash)
            .await?;
        self.state = PortfolioState::with_starting_cash(self.config.starting_cash);
        self.history.clear();
        self.selected = None;
        Ok(profile)
    }

    /// Switch to a stored identity. Re-initializes in-memory state from
    /// the identity's stored portfolio; session-local history is dropped.
    /// Returns `None` when no record exists for the id.
    pub async fn sign_in(&mut self, id: Uuid) -> Result<Option<Profile>, CoreError> {
        match self.sync.set_identity(id).await? {
            Some(state) => {
                self.state = state;
                self.history.clear();
                self.selected = None;
                Ok(self.sync.current_profile())
            }
            None => {
                // Unknown identity: fall back to a blank, unauthenticated
                // state rather than keep another user's portfolio around.
                self.sign_out();
                Ok(None)
            }
        }
    }

    /// Drop the current identity. In-memory state resets to a blank
    /// portfolio that is never persisted.
    pub fn sign_out(&mut self) {
        self.sync.clear_identity();
        self.state = PortfolioState::with_starting_cash(self.config.starting_cash);
        self.history.clear();
        self.selected = None;
    }

    /// The session-visible profile of the current identity, if any.
    #[must_use]
    pub fn profile(&self) -> Option<Profile> {
        self.sync.current_profile()
    }

    // ── Trading ─────────────────────────────────────────────────────

    /// Execute a buy or sell for the current identity at the symbol's
    /// latest quote.
    ///
    /// Tradeability is checked at execution time against the live feed
    /// snapshot: a symbol whose last tick failed (or that was never
    /// quoted this session) is refused with `UntradeableSymbol` even if
    /// a stale price is still on display.
    ///
    /// The mutated state is persisted before returning; a persistence
    /// failure does not undo the trade (memory stays authoritative) but
    /// is logged and retrievable via [`take_persist_error`].
    ///
    /// [`take_persist_error`]: PaperTrader::take_persist_error
    pub async fn execute_trade(
        &mut self,
        kind: TradeKind,
        symbol: &str,
        quantity: f64,
    ) -> Result<Transaction, CoreError> {
        let quote = self
            .feed
            .quote(symbol)
            .cloned()
            .ok_or_else(|| CoreError::UntradeableSymbol(symbol.to_uppercase()))?;

        let transaction =
            self.ledger
                .execute_trade(&mut self.state, kind, symbol, quantity, &quote)?;
        self.persist_after_mutation().await;
        Ok(transaction)
    }

    /// Restore the portfolio to its signup state. Irreversible — shells
    /// must obtain explicit confirmation before calling this.
    pub async fn reset_portfolio(&mut self) {
        self.ledger.reset(&mut self.state, self.config.starting_cash);
        self.persist_after_mutation().await;
    }

    // ── Market Data ─────────────────────────────────────────────────

    /// Run one feed polling cycle over the currently tracked symbol set
    /// (held symbols ∪ watchlist ∪ selection) and record fresh quotes in
    /// the price history. Never fails; per-symbol errors are in the
    /// returned snapshot.
    pub async fn tick(&mut self) -> FeedSnapshot {
        let tracked = tracked_symbols(
            &self.state.held_symbols(),
            &self.config.watchlist,
            self.selected.as_deref(),
        );

        let started_at = Utc::now();
        let snapshot = self.feed.tick(&tracked).await;

        // Only observations made by THIS cycle go into the history —
        // a stale quote retained for display is not a new observation.
        for symbol in &tracked {
            if let Some(quote) = snapshot.quote(symbol) {
                if quote.tradeable && quote.observed_at >= started_at {
                    self.history.append(symbol, quote);
                }
            }
        }

        snapshot
    }

    /// Mark a symbol as selected in the UI so the feed tracks it even
    /// when unheld and off the watchlist.
    pub fn select_symbol(&mut self, symbol: Option<&str>) {
        self.selected = symbol.map(str::to_uppercase);
    }

    #[must_use]
    pub fn selected_symbol(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The latest quote (fresh or stale) for a symbol.
    #[must_use]
    pub fn quote(&self, symbol: &str) -> Option<&Quote> {
        self.feed.quote(symbol)
    }

    /// The merged feed state.
    #[must_use]
    pub fn feed_snapshot(&self) -> &FeedSnapshot {
        self.feed.snapshot()
    }

    /// Outstanding per-symbol feed errors.
    #[must_use]
    pub fn feed_errors(&self) -> Vec<&QuoteError> {
        self.feed.snapshot().errors.values().collect()
    }

    /// The bounded price series for a symbol, oldest first.
    #[must_use]
    pub fn price_history(&self, symbol: &str) -> Vec<HistoryPoint> {
        self.history.points(symbol)
    }

    // ── Valuation & State ───────────────────────────────────────────

    /// Value the portfolio against the latest feed snapshot.
    #[must_use]
    pub fn valuate(&self) -> Valuation {
        self.valuation
            .valuate(&self.state, &self.feed.snapshot().quotes)
    }

    #[must_use]
    pub fn cash(&self) -> f64 {
        self.state.cash
    }

    #[must_use]
    pub fn portfolio(&self) -> &PortfolioState {
        &self.state
    }

    /// Trade history, most recent first.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions(&self.state)
    }

    /// Trade history for one symbol, most recent first.
    #[must_use]
    pub fn transactions_for_symbol(&self, symbol: &str) -> Vec<&Transaction> {
        self.ledger.transactions_for_symbol(&self.state, symbol)
    }

    /// Unencrypted JSON snapshot of the ledger state (for shells and
    /// debugging — the storage collaborator owns real persistence).
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(&self.state)?)
    }

    /// The most recent persistence failure, if any, clearing it.
    pub fn take_persist_error(&mut self) -> Option<CoreError> {
        self.last_persist_error.take()
    }

    #[must_use]
    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    // ── Polling ─────────────────────────────────────────────────────

    /// Start a background poller that ticks a shared trader at its
    /// configured interval. Stop (or drop) the returned poller to stop
    /// polling deterministically.
    pub async fn start_polling(trader: Arc<tokio::sync::Mutex<PaperTrader>>) -> FeedPoller {
        let interval = trader.lock().await.config.poll_interval;
        let mut poller = FeedPoller::new();
        poller.start(interval, move || {
            let trader = trader.clone();
            async move {
                trader.lock().await.tick().await;
            }
        });
        poller
    }

    // ── Internal ────────────────────────────────────────────────────

    async fn persist_after_mutation(&mut self) {
        if let Err(e) = self.sync.persist(&self.state).await {
            tracing::warn!(error = %e, "portfolio persistence failed; in-memory state stays authoritative");
            self.last_persist_error = Some(e);
        }
    }
}
