use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::portfolio::PortfolioState;
use crate::models::quote::Quote;
use crate::models::transaction::{TradeKind, Transaction};

/// Executes trades against a [`PortfolioState`] and maintains its
/// invariants: non-negative cash, strictly positive holdings, weighted
/// average cost basis, append-only trade log.
///
/// Pure business logic — no I/O, no API calls. Easy to test.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Execute a buy or sell at the quoted price.
    ///
    /// Validation happens before any mutation, so a failed trade leaves
    /// the state byte-for-byte untouched. Tradeability is checked here,
    /// at execution time, against the quote the caller passes in — never
    /// against cached UI state.
    ///
    /// On success the new transaction is prepended to the log (the log
    /// reads most-recent-first) and returned.
    pub fn execute_trade(
        &self,
        state: &mut PortfolioState,
        kind: TradeKind,
        symbol: &str,
        quantity: f64,
        quote: &Quote,
    ) -> Result<Transaction, CoreError> {
        let symbol = symbol.to_uppercase();

        if !(quantity > 0.0) || !quantity.is_finite() {
            return Err(CoreError::InvalidQuantity(quantity));
        }
        if !quote.tradeable
            || quote.symbol != symbol
            || !quote.price.is_finite()
            || quote.price <= 0.0
        {
            return Err(CoreError::UntradeableSymbol(symbol));
        }

        let price = quote.price;
        let total = quantity * price;

        match kind {
            TradeKind::Buy => {
                if total > state.cash {
                    return Err(CoreError::InsufficientCash {
                        required: total,
                        available: state.cash,
                    });
                }

                state.cash -= total;
                match state.holdings.get_mut(&symbol) {
                    Some(holding) => {
                        // Quantity-weighted blend of the old basis and this buy
                        let new_quantity = holding.quantity + quantity;
                        holding.average_cost =
                            (holding.average_cost * holding.quantity + total) / new_quantity;
                        holding.quantity = new_quantity;
                    }
                    None => {
                        state.holdings.insert(symbol.clone(), Holding::new(quantity, price));
                    }
                }
            }
            TradeKind::Sell => {
                let held = state.holdings.get(&symbol).map_or(0.0, |h| h.quantity);
                if held < quantity {
                    return Err(CoreError::InsufficientHoldings {
                        symbol,
                        requested: quantity,
                        held,
                    });
                }

                state.cash += total;
                let remaining = held - quantity;
                if remaining <= f64::EPSILON {
                    // Position fully closed — the average cost is
                    // meaningless now and must not be retained.
                    state.holdings.remove(&symbol);
                } else if let Some(holding) = state.holdings.get_mut(&symbol) {
                    // Cost basis is realized on disposal, not recomputed
                    holding.quantity = remaining;
                }
            }
        }

        let id = state.next_transaction_id;
        state.next_transaction_id += 1;
        let transaction = Transaction::new(id, kind, symbol, quantity, price);
        state.transactions.insert(0, transaction.clone());

        tracing::info!(
            id,
            kind = %transaction.kind,
            symbol = %transaction.symbol,
            quantity,
            price,
            cash = state.cash,
            "trade executed"
        );

        Ok(transaction)
    }

    /// Restore the portfolio to its signup state: the configured
    /// starting cash, no holdings, empty log. Irreversible — the caller
    /// is responsible for confirming first.
    pub fn reset(&self, state: &mut PortfolioState, starting_cash: f64) {
        state.cash = starting_cash;
        state.holdings.clear();
        state.transactions.clear();
        state.next_transaction_id = 1;
        tracing::info!("portfolio reset to starting state");
    }

    /// Trade history, most recent first (the log's native order).
    pub fn transactions<'a>(&self, state: &'a PortfolioState) -> &'a [Transaction] {
        &state.transactions
    }

    /// Trade history for one symbol, most recent first.
    #[must_use]
    pub fn transactions_for_symbol<'a>(
        &self,
        state: &'a PortfolioState,
        symbol: &str,
    ) -> Vec<&'a Transaction> {
        let upper = symbol.to_uppercase();
        state
            .transactions
            .iter()
            .filter(|t| t.symbol == upper)
            .collect()
    }

    /// Trade history filtered by direction, most recent first.
    #[must_use]
    pub fn transactions_by_kind<'a>(
        &self,
        state: &'a PortfolioState,
        kind: TradeKind,
    ) -> Vec<&'a Transaction> {
        state
            .transactions
            .iter()
            .filter(|t| t.kind == kind)
            .collect()
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
