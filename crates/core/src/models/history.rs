use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use super::quote::Quote;

/// Maximum points retained per symbol. Appending beyond this evicts the
/// oldest point first (strict FIFO by arrival order).
pub const MAX_HISTORY_POINTS: usize = 100;

/// One charting sample: price at an instant, plus a pre-formatted display
/// time so the frontend just renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Display time, "HH:MM:SS"
    pub time: String,

    pub price: f64,

    pub timestamp: DateTime<Utc>,
}

/// Session-local, bounded, per-symbol price series for charting.
///
/// Each symbol's sequence is independent and capped at
/// [`MAX_HISTORY_POINTS`]. The buffer is not persisted — it exists only
/// for the current session.
#[derive(Debug, Clone, Default)]
pub struct PriceHistoryBuffer {
    series: HashMap<String, VecDeque<HistoryPoint>>,
}

impl PriceHistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful quote observation.
    /// Quotes with a non-positive price are ignored.
    pub fn append(&mut self, symbol: &str, quote: &Quote) {
        if quote.price <= 0.0 {
            return;
        }

        let points = self.series.entry(symbol.to_uppercase()).or_default();
        if points.len() == MAX_HISTORY_POINTS {
            points.pop_front();
        }
        points.push_back(HistoryPoint {
            time: quote.observed_at.format("%H:%M:%S").to_string(),
            price: quote.price,
            timestamp: quote.observed_at,
        });
    }

    /// The recorded series for a symbol, oldest first.
    #[must_use]
    pub fn points(&self, symbol: &str) -> Vec<HistoryPoint> {
        self.series
            .get(&symbol.to_uppercase())
            .map(|points| points.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The most recently recorded point for a symbol.
    #[must_use]
    pub fn latest(&self, symbol: &str) -> Option<&HistoryPoint> {
        self.series.get(&symbol.to_uppercase())?.back()
    }

    /// Number of points recorded for a symbol.
    #[must_use]
    pub fn len(&self, symbol: &str) -> usize {
        self.series
            .get(&symbol.to_uppercase())
            .map_or(0, VecDeque::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Drop all recorded series (e.g., on identity change).
    pub fn clear(&mut self) {
        self.series.clear();
    }
}
