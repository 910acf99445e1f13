//! The fungible-token transfer primitive the staking ledger is layered on.

use crate::AccountId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("insufficient token balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        needed: u128,
        available: u128,
    },

    #[error("insufficient allowance from {owner} to {spender}: need {needed}, have {available}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        needed: u128,
        available: u128,
    },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Trusted token collaborator.
///
/// Each call either moves the full amount or fails without side effects.
pub trait TokenLedger {
    fn balance_of(&self, account: &AccountId) -> u128;

    /// Move tokens held by `from`. The staking ledger only ever calls this
    /// with its own custody account as `from`.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u128)
        -> Result<(), TokenError>;

    /// Pull tokens from `from` on behalf of `spender`, consuming allowance.
    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TokenError>;
}
