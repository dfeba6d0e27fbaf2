//! Ledger errors
//!
//! Business failures of the ledger core, independent of the HTTP layer.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Currency;
use crate::store::StoreError;

/// Terminal outcomes of a single ledger operation. The core never retries
/// or recovers; callers decide how to surface each case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("{amount} {currency} is larger than current balance of account {account}")]
    InsufficientFunds {
        account: Uuid,
        currency: Currency,
        amount: Decimal,
    },

    #[error("unsupported conversion pair {from}-{to}")]
    UnsupportedCurrencyPair { from: Currency, to: Currency },

    #[error("cannot transfer between an account and itself: {0}")]
    SameAccountTransfer(Uuid),

    #[error("id collision while creating account {0}")]
    DuplicateId(Uuid),
}

impl From<StoreError<Uuid>> for LedgerError {
    fn from(err: StoreError<Uuid>) -> Self {
        match err {
            StoreError::NotFound(id) => Self::AccountNotFound(id),
            StoreError::AliasedPair(id) => Self::SameAccountTransfer(id),
        }
    }
}
