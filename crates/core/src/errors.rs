use thiserror::Error;

/// Unified error type for the entire paper-trader-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// Feed failures never surface here: a tick always completes, and
/// network/API/missing-data outcomes are classified per symbol as
/// `QuoteErrorReason` inside the feed snapshot.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Trade Validation ────────────────────────────────────────────
    #[error("Symbol {0} is not tradeable — no fresh quote this session")]
    UntradeableSymbol(String),

    #[error("Insufficient cash: need {required:.2}, have {available:.2}")]
    InsufficientCash { required: f64, available: f64 },

    #[error("Insufficient holdings of {symbol}: tried to sell {requested}, hold {held}")]
    InsufficientHoldings {
        symbol: String,
        requested: f64,
        held: f64,
    },

    #[error("Trade quantity must be positive, got {0}")]
    InvalidQuantity(f64),

    // ── Valuation ───────────────────────────────────────────────────
    #[error("P&L percentage is undefined for {0}: cost basis is zero")]
    CostBasisUndefined(String),

    // ── Persistence ─────────────────────────────────────────────────
    #[error("Failed to persist portfolio: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}
