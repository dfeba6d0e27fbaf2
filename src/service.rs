//! Ledger service
//!
//! Account lifecycle and the transfer algorithm on top of the in-memory
//! store. The service itself is stateless beyond the store it owns; share
//! it (behind an `Arc`) rather than the store.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Account, Currency, LedgerError};
use crate::store::MemStore;

/// The store specialized to accounts. `Account: Clone` supplies the
/// snapshot copies the store hands to readers.
pub type AccountRepository = MemStore<Account>;

#[derive(Default)]
pub struct LedgerService {
    accounts: AccountRepository,
}

impl LedgerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every account, in no particular order.
    pub fn list_accounts(&self) -> Vec<Account> {
        self.accounts.list()
    }

    /// Snapshot of one account, if it exists.
    pub fn get_account(&self, id: Uuid) -> Option<Account> {
        self.accounts.get(&id)
    }

    /// Create an account with a fresh id and the requested opening balance.
    ///
    /// The opening balance is stored as supplied; validating it is the
    /// caller's concern.
    ///
    /// # Errors
    ///
    /// [`LedgerError::DuplicateId`] if the generated id is already taken.
    pub fn create_account(
        &self,
        currency: Currency,
        balance: Decimal,
    ) -> Result<Account, LedgerError> {
        let account = Account::new(currency, balance);
        let id = account.id;
        self.in_transaction(|| {
            if self.accounts.get(&id).is_some() {
                return Err(LedgerError::DuplicateId(id));
            }
            self.accounts.insert(account.clone());
            tracing::debug!(%id, "account created");
            Ok(account)
        })
    }

    /// Move `amount` from `from` to `to` as one atomic pair mutation.
    ///
    /// The currency check and the funds check both run before either balance
    /// is touched, so a failed transfer leaves both accounts as they were.
    /// An amount exactly equal to the source balance succeeds.
    ///
    /// # Errors
    ///
    /// [`LedgerError::AccountNotFound`] if either id is unknown,
    /// [`LedgerError::SameAccountTransfer`] if `from == to`,
    /// [`LedgerError::UnsupportedCurrencyPair`] if the currencies differ,
    /// [`LedgerError::InsufficientFunds`] if `amount` exceeds the source
    /// balance.
    pub fn transfer(&self, from: Uuid, to: Uuid, amount: Decimal) -> Result<(), LedgerError> {
        self.accounts.with_locked_pair(from, to, |source, target| {
            let credited = convert(&source.currency, &target.currency, amount)?;

            if source.balance < amount {
                return Err(LedgerError::InsufficientFunds {
                    account: source.id,
                    currency: source.currency.clone(),
                    amount,
                });
            }

            source.balance -= amount;
            target.balance += credited;
            Ok(())
        })
    }

    /// Run `block` inside the store's write critical section, grouping any
    /// transfers it issues into one atomic unit. Reentrant.
    pub fn in_transaction<T>(&self, block: impl FnOnce() -> T) -> T {
        self.accounts.in_transaction(block)
    }
}

/// Currency conversion hook: the identity for matching currencies, a hard
/// failure for every other pair.
fn convert(from: &Currency, to: &Currency, amount: Decimal) -> Result<Decimal, LedgerError> {
    if from == to {
        return Ok(amount);
    }
    Err(LedgerError::UnsupportedCurrencyPair {
        from: from.clone(),
        to: to.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::massive_run;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("USD").unwrap()
    }

    fn balance_of(service: &LedgerService, id: Uuid) -> Decimal {
        service.get_account(id).unwrap().balance
    }

    #[test]
    fn created_account_round_trips_exactly() {
        let service = LedgerService::new();
        let created = service.create_account(usd(), dec!(100)).unwrap();
        let fetched = service.get_account(created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.currency.code(), "USD");
        assert_eq!(fetched.balance, dec!(100));
    }

    #[test]
    fn negative_opening_balance_is_stored_as_given() {
        let service = LedgerService::new();
        let account = service.create_account(usd(), dec!(-5)).unwrap();
        assert_eq!(balance_of(&service, account.id), dec!(-5));
    }

    #[test]
    fn exact_balance_transfer_empties_the_account() {
        let service = LedgerService::new();
        let from = service.create_account(usd(), dec!(100)).unwrap();
        let to = service.create_account(usd(), dec!(100)).unwrap();

        service.transfer(from.id, to.id, dec!(100)).unwrap();

        assert_eq!(balance_of(&service, from.id), dec!(0));
        assert_eq!(balance_of(&service, to.id), dec!(200));
    }

    #[test]
    fn transfer_over_balance_fails_without_mutation() {
        let service = LedgerService::new();
        let from = service.create_account(usd(), dec!(100)).unwrap();
        let to = service.create_account(usd(), dec!(100)).unwrap();

        let result = service.transfer(from.id, to.id, dec!(100.01));

        assert_eq!(
            result,
            Err(LedgerError::InsufficientFunds {
                account: from.id,
                currency: usd(),
                amount: dec!(100.01),
            })
        );
        assert_eq!(balance_of(&service, from.id), dec!(100));
        assert_eq!(balance_of(&service, to.id), dec!(100));
    }

    #[test]
    fn rejects_cross_currency_transfers() {
        let service = LedgerService::new();
        let from = service.create_account(usd(), dec!(100000)).unwrap();
        let to = service
            .create_account(Currency::new("EUR").unwrap(), dec!(100000))
            .unwrap();

        let result = service.transfer(from.id, to.id, dec!(1));

        assert_eq!(
            result,
            Err(LedgerError::UnsupportedCurrencyPair {
                from: usd(),
                to: Currency::new("EUR").unwrap(),
            })
        );
        assert_eq!(balance_of(&service, from.id), dec!(100000));
        assert_eq!(balance_of(&service, to.id), dec!(100000));
    }

    #[test]
    fn transfer_with_unknown_account_fails_without_mutation() {
        let service = LedgerService::new();
        let account = service.create_account(usd(), dec!(100)).unwrap();
        let ghost = Uuid::new_v4();

        assert_eq!(
            service.transfer(account.id, ghost, dec!(1)),
            Err(LedgerError::AccountNotFound(ghost))
        );
        assert_eq!(
            service.transfer(ghost, account.id, dec!(1)),
            Err(LedgerError::AccountNotFound(ghost))
        );
        assert_eq!(balance_of(&service, account.id), dec!(100));
    }

    #[test]
    fn rejects_self_transfer() {
        let service = LedgerService::new();
        let account = service.create_account(usd(), dec!(100)).unwrap();

        assert_eq!(
            service.transfer(account.id, account.id, dec!(1)),
            Err(LedgerError::SameAccountTransfer(account.id))
        );
        assert_eq!(balance_of(&service, account.id), dec!(100));
    }

    #[test]
    fn parallel_cyclic_transfers_settle_deterministically() {
        let service = LedgerService::new();
        let a = service.create_account(usd(), dec!(100000)).unwrap();
        let b = service.create_account(usd(), dec!(200000)).unwrap();
        let c = service.create_account(usd(), dec!(300000)).unwrap();

        massive_run(|_| {
            service.transfer(a.id, b.id, dec!(1)).unwrap();
            service.transfer(b.id, c.id, dec!(2)).unwrap();
            service.transfer(c.id, a.id, dec!(3)).unwrap();
        });

        assert_eq!(balance_of(&service, a.id), dec!(300000));
        assert_eq!(balance_of(&service, b.id), dec!(100000));
        assert_eq!(balance_of(&service, c.id), dec!(200000));
    }

    #[test]
    fn unit_transfers_around_a_ring_conserve_every_balance() {
        let service = LedgerService::new();
        massive_run(|_| {
            service.create_account(usd(), dec!(10)).unwrap();
        });

        let mut ids: Vec<Uuid> = service.list_accounts().iter().map(|a| a.id).collect();
        ids.push(ids[0]);

        massive_run(|index| {
            service.transfer(ids[index], ids[index + 1], dec!(3)).unwrap();
        });

        for account in service.list_accounts() {
            assert_eq!(account.balance, dec!(10));
        }
    }

    #[test]
    fn transactions_group_parallel_transfer_cycles() {
        let service = LedgerService::new();
        let a = service.create_account(usd(), dec!(100000)).unwrap();
        let b = service.create_account(usd(), dec!(200000)).unwrap();
        let c = service.create_account(usd(), dec!(300000)).unwrap();

        // Each cycle drains a to zero mid-block; only the transaction keeps
        // other workers from observing that state and failing the funds
        // check.
        massive_run(|_| {
            service.in_transaction(|| {
                service.transfer(a.id, b.id, dec!(100000)).unwrap();
                service.transfer(b.id, c.id, dec!(100000)).unwrap();
                service.transfer(c.id, a.id, dec!(100000)).unwrap();
            });
        });

        assert_eq!(balance_of(&service, a.id), dec!(100000));
        assert_eq!(balance_of(&service, b.id), dec!(200000));
        assert_eq!(balance_of(&service, c.id), dec!(300000));
    }
}
