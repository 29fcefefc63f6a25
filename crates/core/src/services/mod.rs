pub mod feed_service;
pub mod ledger_service;
pub mod poller;
pub mod sync_service;
pub mod valuation_service;
