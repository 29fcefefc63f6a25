use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// One symbol's raw price data as the external source reports it.
///
/// Field names follow the wire contract: price in USD plus the 24-hour
/// change in percent.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawQuote {
    pub usd: f64,

    #[serde(default)]
    pub usd_24h_change: f64,
}

/// A whole-request failure, before any per-symbol data exists.
///
/// Distinguishes the transport never completing from the source answering
/// with a non-success response — the feed maps these onto different
/// per-symbol error reasons.
#[derive(Debug, Clone)]
pub enum SourceFailure {
    /// The request never completed (DNS, TLS, timeout, ...)
    Network(String),
    /// The source responded, but not with success
    Api { status: u16, message: String },
}

/// Trait abstraction over the external quote source (the network boundary).
///
/// The single production implementation is [`CoinGeckoSource`]; tests and
/// offline shells inject their own. One call fetches ALL requested
/// identifiers in a single batched request — the feed never issues one
/// request per symbol.
///
/// [`CoinGeckoSource`]: super::coingecko::CoinGeckoSource
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch current prices for a batch of external identifiers
    /// (e.g., "bitcoin", "ethereum").
    ///
    /// A missing key in the returned map means the source had no data for
    /// that identifier; that is NOT an `Err` — only whole-request failures
    /// are.
    async fn fetch_quotes(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, RawQuote>, SourceFailure>;
}
