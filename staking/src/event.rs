//! Events emitted by the staking ledger.

use crate::deposit::DepositId;
use serde::{Deserialize, Serialize};
use tally_types::{AccountId, Ratio};

/// Ledger events, field-exact for external observers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingEvent {
    Deposited {
        sender: AccountId,
        id: DepositId,
        amount: u128,
        /// Balance of the slot after the deposit.
        user_balance: u128,
        /// Reward paid out while settling the slot.
        reward: u128,
        prev_deposit_duration: u64,
        reward_factor: u128,
        total_staked: u128,
    },
    Withdrawn {
        sender: AccountId,
        id: DepositId,
        withdrawal_sum: u128,
        fee: u128,
        balance: u128,
        reward: u128,
        last_deposit_duration: u64,
        total_staked: u128,
        total_remaining_reward: u128,
    },
    BeforeDepositAndRewardWithdrawn {
        sender: AccountId,
        id: DepositId,
        deposit: u128,
        reward: u128,
    },
    WithdrawalRequested {
        sender: AccountId,
        id: DepositId,
    },
    RewardUpdated {
        stakers_reward: u128,
        owner_reward: u128,
        total_remaining_reward: u128,
        total_stakers_reward: u128,
        total_owner_reward: u128,
    },
    RewardFactorUpdated {
        reward_factor: u128,
        total_staked: u128,
    },
    FeeSet {
        value: Ratio,
        sender: AccountId,
    },
    WithdrawalLockDurationSet {
        value: u64,
        sender: AccountId,
    },
    WithdrawalUnlockDurationSet {
        value: u64,
        sender: AccountId,
    },
    RewardSharePercentSet {
        value: Ratio,
        sender: AccountId,
    },
}

impl StakingEvent {
    /// Event name as observers know it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deposited { .. } => "Deposited",
            Self::Withdrawn { .. } => "Withdrawn",
            Self::BeforeDepositAndRewardWithdrawn { .. } => "BeforeDepositAndRewardWithdrawn",
            Self::WithdrawalRequested { .. } => "WithdrawalRequested",
            Self::RewardUpdated { .. } => "RewardUpdated",
            Self::RewardFactorUpdated { .. } => "RewardFactorUpdated",
            Self::FeeSet { .. } => "FeeSet",
            Self::WithdrawalLockDurationSet { .. } => "WithdrawalLockDurationSet",
            Self::WithdrawalUnlockDurationSet { .. } => "WithdrawalUnlockDurationSet",
            Self::RewardSharePercentSet { .. } => "RewardSharePercentSet",
        }
    }
}
