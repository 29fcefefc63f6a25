use std::collections::HashMap;

/// Fixed mapping from tradeable ticker symbol to the external source's
/// identifier (e.g., BTC → bitcoin).
///
/// Symbols outside the catalog are never dispatched to the source and are
/// always untradeable. The default catalog covers the instruments the
/// platform offers; shells embedding the core can construct a narrower one.
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    ids: HashMap<String, String>,
}

impl InstrumentCatalog {
    /// The standard instrument set.
    pub fn new_with_defaults() -> Self {
        let entries = [
            ("BTC", "bitcoin"),
            ("ETH", "ethereum"),
            ("SOL", "solana"),
            ("XRP", "ripple"),
            ("ADA", "cardano"),
            ("DOGE", "dogecoin"),
            ("DOT", "polkadot"),
            ("LTC", "litecoin"),
            ("AVAX", "avalanche-2"),
            ("LINK", "chainlink"),
            ("MATIC", "matic-network"),
            ("ATOM", "cosmos"),
        ];

        let mut ids = HashMap::new();
        for (symbol, id) in entries {
            ids.insert(symbol.to_string(), id.to_string());
        }
        Self { ids }
    }

    /// Build a catalog from explicit (symbol, external id) pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let ids = entries
            .into_iter()
            .map(|(symbol, id)| (symbol.into().to_uppercase(), id.into()))
            .collect();
        Self { ids }
    }

    /// The external identifier for a symbol, if it is in the catalog.
    #[must_use]
    pub fn external_id(&self, symbol: &str) -> Option<&str> {
        self.ids.get(&symbol.to_uppercase()).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.ids.contains_key(&symbol.to_uppercase())
    }

    /// All catalog symbols, sorted for deterministic iteration.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.ids.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for InstrumentCatalog {
    fn default() -> Self {
        Self::new_with_defaults()
    }
}
