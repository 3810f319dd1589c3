pub mod catalog;
pub mod credential;
pub mod ledger;
pub mod payment;
