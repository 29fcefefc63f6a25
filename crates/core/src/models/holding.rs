use serde::{Deserialize, Serialize};

/// A currently-held position in one symbol.
///
/// A holding exists only while `quantity > 0` — the ledger removes the
/// entry from the holdings map the instant a sell brings it to zero, so
/// a stale average cost is never retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Units held (always > 0 while the entry exists)
    pub quantity: f64,

    /// Quantity-weighted mean acquisition price per unit.
    /// Recomputed on buys, untouched by sells.
    pub average_cost: f64,
}

impl Holding {
    pub fn new(quantity: f64, average_cost: f64) -> Self {
        Self {
            quantity,
            average_cost,
        }
    }

    /// Total acquisition cost of this position (`quantity * average_cost`).
    #[must_use]
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.average_cost
    }
}
