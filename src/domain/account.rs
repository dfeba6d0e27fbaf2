//! Account entity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Currency;
use crate::store::Entity;

/// A monetary account.
///
/// `id` and `currency` are fixed at creation; `balance` changes only through
/// the ledger's transfer path, inside the store's write critical section.
/// The opening balance is stored exactly as supplied, negative values
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub currency: Currency,
    pub balance: Decimal,
}

impl Account {
    /// Build an account with a freshly generated id.
    pub fn new(currency: Currency, balance: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            currency,
            balance,
        }
    }
}

impl Entity for Account {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }
}
