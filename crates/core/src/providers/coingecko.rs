use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use super::traits::{QuoteSource, RawQuote, SourceFailure};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko quote source.
///
/// - **Free**: no API key required at the polling rates this core uses.
/// - **Endpoint**: `/simple/price?ids=...&vs_currencies=usd&include_24hr_change=true`
/// - Identifiers are CoinGecko's lowercase ids ("bitcoin", "ethereum");
///   the instrument catalog owns the symbol → id mapping.
pub struct CoinGeckoSource {
    client: Client,
    base_url: String,
}

impl CoinGeckoSource {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the source at a different base URL (tests, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
        }
    }
}

impl Default for CoinGeckoSource {
    fn default() -> Self {
        Self::new()
    }
}

// reqwest errors can embed the full request URL; strip the query so a
// shell that logs failures never echoes the request parameters.
fn redact_query(message: &str) -> String {
    match message.find('?') {
        Some(idx) => format!("{}?<query redacted>", &message[..idx]),
        None => message.to_string(),
    }
}

#[async_trait]
impl QuoteSource for CoinGeckoSource {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    async fn fetch_quotes(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, RawQuote>, SourceFailure> {
        let joined = ids.join(",");
        let url = format!(
            "{}/simple/price?ids={joined}&vs_currencies=usd&include_24hr_change=true",
            self.base_url
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceFailure::Network(redact_query(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceFailure::Api {
                status: status.as_u16(),
                message: format!("quote request returned {status}"),
            });
        }

        // The response body is a map keyed by the requested ids; ids the
        // source has no data for are simply absent.
        response
            .json::<HashMap<String, RawQuote>>()
            .await
            .map_err(|e| SourceFailure::Api {
                status: status.as_u16(),
                message: format!("failed to parse quote response: {e}"),
            })
    }
}
