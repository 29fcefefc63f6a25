use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why a symbol has no fresh quote in the current poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteErrorReason {
    /// The source responded but had no data for this symbol
    DataUnavailable,
    /// The source returned a non-success response for the whole request
    ApiError,
    /// The request never completed (transport failure)
    NetworkError,
}

impl std::fmt::Display for QuoteErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteErrorReason::DataUnavailable => write!(f, "data unavailable"),
            QuoteErrorReason::ApiError => write!(f, "API error"),
            QuoteErrorReason::NetworkError => write!(f, "network error"),
        }
    }
}

/// One observed price for one symbol.
///
/// Quotes are ephemeral: each poll cycle either replaces a symbol's quote
/// with a fresh one or retains the previous quote with `tradeable` flipped
/// off (stale price stays visible, but trades against it are refused).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol, uppercased
    pub symbol: String,

    /// Last observed price in USD (always > 0)
    pub price: f64,

    /// 24-hour change reported by the source, in percent
    pub change_percent_24h: f64,

    /// When this price was observed
    pub observed_at: DateTime<Utc>,

    /// Whether the most recent tick produced this quote successfully.
    /// Only tradeable quotes may back a trade execution.
    pub tradeable: bool,
}

/// A per-symbol feed failure for the current cycle.
///
/// Cleared the moment a successful quote for the symbol arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteError {
    pub symbol: String,
    pub reason: QuoteErrorReason,
}

/// Merged feed state after a tick: last known quotes (fresh or stale)
/// plus the per-symbol errors still outstanding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub quotes: HashMap<String, Quote>,
    pub errors: HashMap<String, QuoteError>,
}

impl FeedSnapshot {
    /// The quote for `symbol`, fresh or stale.
    #[must_use]
    pub fn quote(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(&symbol.to_uppercase())
    }

    /// True iff the most recent tick produced a successful quote for `symbol`.
    #[must_use]
    pub fn is_tradeable(&self, symbol: &str) -> bool {
        self.quote(symbol).is_some_and(|q| q.tradeable)
    }
}
