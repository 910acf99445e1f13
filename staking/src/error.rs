//! Staking-specific errors.

use crate::deposit::DepositId;
use tally_params::ParamError;
use tally_types::{AccountId, TokenError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("caller {0} is not the owner")]
    Unauthorized(AccountId),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("wrong deposit id {0}")]
    WrongDepositId(DepositId),

    #[error("insufficient funds in deposit {0}")]
    InsufficientFunds(DepositId),

    #[error("withdrawal of deposit {0} wasn't requested")]
    WithdrawalNotRequested(DepositId),

    #[error("withdrawal of deposit {0} has already been requested")]
    WithdrawalAlreadyRequested(DepositId),

    #[error("too early: {remaining}s of the withdrawal lock remain")]
    TooEarly { remaining: u64 },

    #[error("too late: the unlock window closed {overdue}s ago")]
    TooLate { overdue: u64 },

    #[error("token transfer failed: {0}")]
    TransferFailed(#[from] TokenError),

    /// A pulled deposit could not be returned. `amount` stays in custody
    /// without a matching slot.
    #[error("refund of {amount} to {account} failed after {cause}: {reason}")]
    RefundFailed {
        account: AccountId,
        amount: u128,
        cause: Box<StakingError>,
        reason: TokenError,
    },

    #[error("arithmetic overflow in reward accounting")]
    Overflow,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl From<ParamError> for StakingError {
    fn from(e: ParamError) -> Self {
        Self::InvalidParameter(e.to_string())
    }
}
