use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::holding::Holding;
use super::transaction::Transaction;

/// Cash every portfolio starts with (and returns to on reset).
pub const STARTING_CASH: f64 = 100_000.0;

/// The full ledger state for one identity: cash, holdings, and the
/// append-only trade log.
///
/// Invariant: cash plus the sum over holdings of
/// `quantity * average_cost` equals cumulative cash invested minus
/// cumulative cash withdrawn — a trade only exchanges value between cash
/// and a holding, it never creates or destroys any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    /// Available cash balance (never negative)
    pub cash: f64,

    /// Open positions, keyed by uppercase symbol.
    /// Entries exist only while `quantity > 0`.
    pub holdings: HashMap<String, Holding>,

    /// Trade log, most recent first (new transactions are prepended)
    pub transactions: Vec<Transaction>,

    /// Next transaction id to assign. Monotonic; survives persistence.
    #[serde(default = "default_next_id")]
    pub next_transaction_id: u64,
}

fn default_next_id() -> u64 {
    1
}

impl PortfolioState {
    /// Fresh portfolio as created at signup: starting cash, nothing held,
    /// no history.
    pub fn new() -> Self {
        Self::with_starting_cash(STARTING_CASH)
    }

    /// Fresh portfolio with a configured starting balance.
    pub fn with_starting_cash(cash: f64) -> Self {
        Self {
            cash,
            holdings: HashMap::new(),
            transactions: Vec::new(),
            next_transaction_id: 1,
        }
    }

    /// Sum of all holdings' cost bases.
    #[must_use]
    pub fn invested_basis(&self) -> f64 {
        self.holdings.values().map(Holding::cost_basis).sum()
    }

    /// Symbols currently held, for feed tracking.
    #[must_use]
    pub fn held_symbols(&self) -> Vec<String> {
        self.holdings.keys().cloned().collect()
    }
}

impl Default for PortfolioState {
    fn default() -> Self {
        Self::new()
    }
}
