//! Global reward accounting.

use crate::error::StakingError;
use serde::{Deserialize, Serialize};
use tally_types::{mul_div, Ratio, SCALE};

/// Ledger-wide totals and the reward accumulator.
///
/// `reward_factor` is the cumulative reward per staked unit since genesis,
/// scaled by `SCALE`. It only ever grows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardState {
    pub reward_factor: u128,
    /// Sum of all nonzero deposit amounts.
    pub total_staked: u128,
    /// Tokens held for rewards: distributions and withheld fees, minus payouts.
    pub total_remaining_reward: u128,
    /// Cumulative stakers' share of every distribution.
    pub total_stakers_reward: u128,
    /// Cumulative owner's share of every distribution.
    pub total_owner_reward: u128,
}

/// How one distribution was split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Distribution {
    pub stakers_share: u128,
    pub owner_share: u128,
    /// `None` when nothing was staked and the factor stayed put.
    pub factor_increment: Option<u128>,
}

impl RewardState {
    /// Split `reward` by `share` and fold it into the totals.
    ///
    /// Computes everything before mutating, so an overflow leaves `self`
    /// untouched.
    pub fn apply_distribution(
        &mut self,
        reward: u128,
        share: Ratio,
    ) -> Result<Distribution, StakingError> {
        let stakers_share = share.apply(reward).ok_or(StakingError::Overflow)?;
        let owner_share = reward
            .checked_sub(stakers_share)
            .ok_or(StakingError::Overflow)?;

        let factor_increment = if self.total_staked > 0 {
            Some(mul_div(stakers_share, SCALE, self.total_staked).ok_or(StakingError::Overflow)?)
        } else {
            None
        };

        let reward_factor = self
            .reward_factor
            .checked_add(factor_increment.unwrap_or(0))
            .ok_or(StakingError::Overflow)?;
        let total_remaining_reward = self
            .total_remaining_reward
            .checked_add(reward)
            .ok_or(StakingError::Overflow)?;
        let total_stakers_reward = self
            .total_stakers_reward
            .checked_add(stakers_share)
            .ok_or(StakingError::Overflow)?;
        let total_owner_reward = self
            .total_owner_reward
            .checked_add(owner_share)
            .ok_or(StakingError::Overflow)?;

        self.reward_factor = reward_factor;
        self.total_remaining_reward = total_remaining_reward;
        self.total_stakers_reward = total_stakers_reward;
        self.total_owner_reward = total_owner_reward;

        Ok(Distribution {
            stakers_share,
            owner_share,
            factor_increment,
        })
    }
}
