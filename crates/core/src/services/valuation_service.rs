use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::portfolio::{PortfolioState, STARTING_CASH};
use crate::models::quote::Quote;
use crate::models::transaction::TradeKind;

/// Valuation of one held position against the current feed snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub symbol: String,

    /// Units held
    pub quantity: f64,

    /// Quantity-weighted mean acquisition price
    pub average_cost: f64,

    /// Latest price, if any quote (fresh or stale) exists for the symbol
    pub price: Option<f64>,

    /// `quantity * price`, or 0 when no quote exists — the holding is
    /// still listed either way
    pub market_value: f64,

    /// `market_value - quantity * average_cost`
    pub unrealized_pnl: f64,

    /// P&L as a percentage of cost basis. `None` means undefined (zero
    /// cost basis) — never NaN.
    pub unrealized_pnl_pct: Option<f64>,

    /// This position's share of total holdings value, in percent
    pub allocation_pct: f64,
}

/// Whole-portfolio valuation: equity, P&L, and the per-holding breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub cash: f64,

    /// Σ quantity * price over holdings with a quote
    pub holdings_value: f64,

    /// `cash + holdings_value`
    pub total_equity: f64,

    /// Return versus starting cash, in percent
    pub all_time_return_pct: f64,

    /// Per-holding rows, sorted by market value descending
    pub holdings: Vec<HoldingValuation>,

    pub total_trades: usize,
    pub buy_count: usize,
    pub sell_count: usize,
}

/// Derives portfolio market value, equity, and unrealized P&L from ledger
/// state plus the latest quote snapshot. Pure over its inputs — it never
/// mutates either side. Carries only the starting-cash baseline the
/// all-time return is measured against.
pub struct ValuationService {
    starting_cash: f64,
}

impl ValuationService {
    pub fn new() -> Self {
        Self::with_starting_cash(STARTING_CASH)
    }

    /// Measure all-time return against a configured starting balance.
    pub fn with_starting_cash(starting_cash: f64) -> Self {
        Self { starting_cash }
    }

    /// Value the portfolio against a quote snapshot.
    ///
    /// A holding with no current quote contributes zero to market value
    /// but still appears in the breakdown, so the shell can show it as
    /// unpriced rather than silently dropping it.
    #[must_use]
    pub fn valuate(&self, state: &PortfolioState, quotes: &HashMap<String, Quote>) -> Valuation {
        let mut rows: Vec<HoldingValuation> = Vec::with_capacity(state.holdings.len());
        let mut holdings_value = 0.0;

        for (symbol, holding) in &state.holdings {
            let price = quotes.get(symbol).map(|q| q.price);
            let market_value = holding.quantity * price.unwrap_or(0.0);
            holdings_value += market_value;

            let cost_basis = holding.cost_basis();
            let unrealized_pnl = market_value - cost_basis;
            let unrealized_pnl_pct = if cost_basis > 0.0 {
                Some(unrealized_pnl / cost_basis * 100.0)
            } else {
                None
            };

            rows.push(HoldingValuation {
                symbol: symbol.clone(),
                quantity: holding.quantity,
                average_cost: holding.average_cost,
                price,
                market_value,
                unrealized_pnl,
                unrealized_pnl_pct,
                allocation_pct: 0.0, // filled below
            });
        }

        for row in &mut rows {
            row.allocation_pct = if holdings_value > 0.0 {
                row.market_value / holdings_value * 100.0
            } else {
                0.0
            };
        }

        // Largest positions first
        rows.sort_by(|a, b| {
            b.market_value
                .partial_cmp(&a.market_value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total_equity = state.cash + holdings_value;
        let buy_count = state
            .transactions
            .iter()
            .filter(|t| t.kind == TradeKind::Buy)
            .count();

        Valuation {
            cash: state.cash,
            holdings_value,
            total_equity,
            all_time_return_pct: (total_equity - self.starting_cash) / self.starting_cash * 100.0,
            holdings: rows,
            total_trades: state.transactions.len(),
            buy_count,
            sell_count: state.transactions.len() - buy_count,
        }
    }

    /// P&L percentage for a single position, with a zero cost basis
    /// signaled as an error rather than returned as NaN.
    pub fn pnl_percent(
        &self,
        symbol: &str,
        market_value: f64,
        cost_basis: f64,
    ) -> Result<f64, CoreError> {
        if cost_basis <= 0.0 {
            return Err(CoreError::CostBasisUndefined(symbol.to_uppercase()));
        }
        Ok((market_value - cost_basis) / cost_basis * 100.0)
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
