pub mod catalog;
pub mod traits;

// Quote source implementations
pub mod coingecko;
