pub mod history;
pub mod holding;
pub mod portfolio;
pub mod profile;
pub mod quote;
pub mod transaction;
