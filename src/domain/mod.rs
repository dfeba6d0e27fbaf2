//! Domain module
//!
//! Core domain types of the ledger.

pub mod account;
pub mod currency;
pub mod error;

pub use account::Account;
pub use currency::{Currency, CurrencyError};
pub use error::LedgerError;
