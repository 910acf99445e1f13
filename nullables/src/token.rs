//! Nullable token — an in-memory fungible token with allowances.

use std::collections::HashMap;
use tally_types::{AccountId, TokenError, TokenLedger};

/// In-memory token ledger.
///
/// Transfers are all-or-nothing. `fail_next` and `fail_after` inject a
/// rejected transfer, for exercising rollback paths. `freeze_after` keeps
/// rejecting until `thaw`.
#[derive(Clone, Debug, Default)]
pub struct NullToken {
    balances: HashMap<AccountId, u128>,
    allowances: HashMap<(AccountId, AccountId), u128>,
    /// (transfers to let through, reason, keep rejecting once triggered)
    failure: Option<(usize, String, bool)>,
    transfers: usize,
}

impl NullToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `account` out of thin air.
    pub fn mint(&mut self, account: &AccountId, amount: u128) {
        *self.balances.entry(account.clone()).or_default() += amount;
    }

    /// Let `spender` pull up to `amount` from `owner`. Replaces any previous allowance.
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: u128) {
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    /// Mint and approve in one call.
    pub fn fund(&mut self, account: &AccountId, spender: &AccountId, amount: u128) {
        self.mint(account, amount);
        self.approve(account, spender, amount);
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> u128 {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Reject the next transfer with `reason`.
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.fail_after(0, reason);
    }

    /// Let `skip` transfers through, then reject one with `reason`.
    pub fn fail_after(&mut self, skip: usize, reason: impl Into<String>) {
        self.failure = Some((skip, reason.into(), false));
    }

    /// Let `skip` transfers through, then reject every later one.
    pub fn freeze_after(&mut self, skip: usize, reason: impl Into<String>) {
        self.failure = Some((skip, reason.into(), true));
    }

    /// Clear any pending or ongoing failure.
    pub fn thaw(&mut self) {
        self.failure = None;
    }

    fn check_failure(&mut self) -> Result<(), TokenError> {
        match self.failure.take() {
            Some((0, reason, sticky)) => {
                if sticky {
                    self.failure = Some((0, reason.clone(), true));
                }
                Err(TokenError::Rejected(reason))
            }
            Some((skip, reason, sticky)) => {
                self.failure = Some((skip - 1, reason, sticky));
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Number of successful transfers so far.
    pub fn transfer_count(&self) -> usize {
        self.transfers
    }

    fn move_tokens(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                account: from.clone(),
                needed: amount,
                available,
            });
        }
        self.balances.insert(from.clone(), available - amount);
        *self.balances.entry(to.clone()).or_default() += amount;
        self.transfers += 1;
        Ok(())
    }
}

impl TokenLedger for NullToken {
    fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.check_failure()?;
        self.move_tokens(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.check_failure()?;
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: from.clone(),
                spender: spender.clone(),
                needed: amount,
                available: allowed,
            });
        }
        self.move_tokens(from, to, amount)?;
        self.allowances
            .insert((from.clone(), spender.clone()), allowed - amount);
        Ok(())
    }
}
