//! Read-only eligibility query that governance runs against staking.

use crate::AccountId;

/// Live staked balance of an account.
///
/// Governance only ever needs this one number, so it depends on the trait
/// rather than on the staking ledger itself. Tests substitute fixed balances.
pub trait StakeView {
    /// Sum of every nonzero deposit currently owned by `account`.
    fn total_user_balance(&self, account: &AccountId) -> u128;
}

impl<T: StakeView + ?Sized> StakeView for &T {
    fn total_user_balance(&self, account: &AccountId) -> u128 {
        (**self).total_user_balance(account)
    }
}
