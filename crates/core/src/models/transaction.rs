use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeKind {
    /// Acquiring an asset (cash out, holding in)
    Buy,
    /// Disposing of an asset (holding out, cash in)
    Sell,
}

impl std::fmt::Display for TradeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeKind::Buy => write!(f, "Buy"),
            TradeKind::Sell => write!(f, "Sell"),
        }
    }
}

/// A single executed trade.
///
/// Transactions are immutable once created: the ledger prepends each one
/// to the log and never mutates or deletes it, so the log reads
/// most-recent-first without sorting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Monotonically increasing identifier, unique per portfolio
    pub id: u64,

    /// Buy or Sell
    pub kind: TradeKind,

    /// Ticker symbol, uppercased (e.g., "BTC")
    pub symbol: String,

    /// Units traded (always positive)
    pub quantity: f64,

    /// Execution price per unit
    pub price: f64,

    /// Cash moved: `quantity * price`
    pub total: f64,

    /// Instant the trade was applied
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(id: u64, kind: TradeKind, symbol: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self {
            id,
            kind,
            symbol: symbol.into().to_uppercase(),
            quantity,
            price,
            total: quantity * price,
            timestamp: Utc::now(),
        }
    }
}
