//! Nullable stake view — fixed balances for governance tests.

use std::collections::HashMap;
use tally_types::{AccountId, StakeView};

/// Stake balances set directly by the test.
#[derive(Clone, Debug, Default)]
pub struct NullStakeView {
    balances: HashMap<AccountId, u128>,
}

impl NullStakeView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper: `NullStakeView::new().with("alice", 100)`.
    pub fn with(mut self, account: &str, balance: u128) -> Self {
        self.set(AccountId::new(account), balance);
        self
    }

    pub fn set(&mut self, account: AccountId, balance: u128) {
        self.balances.insert(account, balance);
    }

    /// Drop an account to zero stake.
    pub fn clear(&mut self, account: &AccountId) {
        self.balances.remove(account);
    }
}

impl StakeView for NullStakeView {
    fn total_user_balance(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_accounts_have_no_stake() {
        let mut view = NullStakeView::new().with("alice", 5);
        let alice = AccountId::new("alice");
        assert_eq!(view.total_user_balance(&alice), 5);
        assert_eq!(view.total_user_balance(&AccountId::new("bob")), 0);
        view.clear(&alice);
        assert_eq!(view.total_user_balance(&alice), 0);
    }
}
