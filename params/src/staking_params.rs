//! The four delayed parameters of the staking ledger and their valid ranges.

use crate::delayed::DelayedParam;
use crate::error::ParamError;
use crate::kind::ParamKind;
use serde::{Deserialize, Serialize};
use tally_types::{Ratio, Timestamp, DAY, HOUR};

/// Upper bound for the withdrawal lock: 30 days.
pub const MAX_WITHDRAWAL_LOCK_DURATION: u64 = 30 * DAY;

/// Lower bound for the withdrawal unlock window: 1 hour.
pub const MIN_WITHDRAWAL_UNLOCK_DURATION: u64 = HOUR;

/// Fee, withdrawal timing, and reward share, each behind a 7-day notice period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    fee: DelayedParam<Ratio>,
    withdrawal_lock_duration: DelayedParam<u64>,
    withdrawal_unlock_duration: DelayedParam<u64>,
    reward_share_percent: DelayedParam<Ratio>,
}

impl StakingParams {
    /// Validate and install the initial values. Nothing is pending afterwards.
    pub fn new(
        fee: Ratio,
        withdrawal_lock_duration: u64,
        withdrawal_unlock_duration: u64,
        reward_share_percent: Ratio,
    ) -> Result<Self, ParamError> {
        validate_fee(fee)?;
        validate_withdrawal_lock_duration(withdrawal_lock_duration)?;
        validate_withdrawal_unlock_duration(withdrawal_unlock_duration)?;
        validate_reward_share_percent(reward_share_percent)?;
        Ok(Self {
            fee: DelayedParam::new(fee),
            withdrawal_lock_duration: DelayedParam::new(withdrawal_lock_duration),
            withdrawal_unlock_duration: DelayedParam::new(withdrawal_unlock_duration),
            reward_share_percent: DelayedParam::new(reward_share_percent),
        })
    }

    pub fn fee(&self, now: Timestamp) -> Ratio {
        self.fee.get(now)
    }

    pub fn withdrawal_lock_duration(&self, now: Timestamp) -> u64 {
        self.withdrawal_lock_duration.get(now)
    }

    pub fn withdrawal_unlock_duration(&self, now: Timestamp) -> u64 {
        self.withdrawal_unlock_duration.get(now)
    }

    pub fn reward_share_percent(&self, now: Timestamp) -> Ratio {
        self.reward_share_percent.get(now)
    }

    /// Schedule a new fee; returns when it takes effect.
    pub fn set_fee(&mut self, value: Ratio, now: Timestamp) -> Result<Timestamp, ParamError> {
        validate_fee(value)?;
        Ok(self.fee.schedule(value, now))
    }

    pub fn set_withdrawal_lock_duration(
        &mut self,
        value: u64,
        now: Timestamp,
    ) -> Result<Timestamp, ParamError> {
        validate_withdrawal_lock_duration(value)?;
        Ok(self.withdrawal_lock_duration.schedule(value, now))
    }

    pub fn set_withdrawal_unlock_duration(
        &mut self,
        value: u64,
        now: Timestamp,
    ) -> Result<Timestamp, ParamError> {
        validate_withdrawal_unlock_duration(value)?;
        Ok(self.withdrawal_unlock_duration.schedule(value, now))
    }

    pub fn set_reward_share_percent(
        &mut self,
        value: Ratio,
        now: Timestamp,
    ) -> Result<Timestamp, ParamError> {
        validate_reward_share_percent(value)?;
        Ok(self.reward_share_percent.schedule(value, now))
    }

    /// When the most recent schedule of `kind` takes (or took) effect.
    pub fn effective_at(&self, kind: ParamKind) -> Timestamp {
        match kind {
            ParamKind::Fee => self.fee.effective_at(),
            ParamKind::WithdrawalLockDuration => self.withdrawal_lock_duration.effective_at(),
            ParamKind::WithdrawalUnlockDuration => self.withdrawal_unlock_duration.effective_at(),
            ParamKind::RewardSharePercent => self.reward_share_percent.effective_at(),
        }
    }
}

pub fn validate_fee(value: Ratio) -> Result<(), ParamError> {
    if value > Ratio::ONE {
        return Err(ParamError::InvalidParameter {
            param: ParamKind::Fee.name(),
            reason: "should be less than or equal to 1",
        });
    }
    Ok(())
}

pub fn validate_withdrawal_lock_duration(value: u64) -> Result<(), ParamError> {
    if value > MAX_WITHDRAWAL_LOCK_DURATION {
        return Err(ParamError::InvalidParameter {
            param: ParamKind::WithdrawalLockDuration.name(),
            reason: "shouldn't be greater than 30 days",
        });
    }
    Ok(())
}

pub fn validate_withdrawal_unlock_duration(value: u64) -> Result<(), ParamError> {
    if value < MIN_WITHDRAWAL_UNLOCK_DURATION {
        return Err(ParamError::InvalidParameter {
            param: ParamKind::WithdrawalUnlockDuration.name(),
            reason: "shouldn't be less than 1 hour",
        });
    }
    Ok(())
}

pub fn validate_reward_share_percent(value: Ratio) -> Result<(), ParamError> {
    if value > Ratio::ONE {
        return Err(ParamError::InvalidParameter {
            param: ParamKind::RewardSharePercent.name(),
            reason: "should be less than or equal to 1",
        });
    }
    Ok(())
}
