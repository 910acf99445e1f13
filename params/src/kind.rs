//! Names of the delayed parameters.

use serde::{Deserialize, Serialize};

/// Every parameter held in the delayed store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    Fee,
    WithdrawalLockDuration,
    WithdrawalUnlockDuration,
    RewardSharePercent,
}

impl ParamKind {
    /// Human-readable name of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fee => "fee",
            Self::WithdrawalLockDuration => "withdrawal_lock_duration",
            Self::WithdrawalUnlockDuration => "withdrawal_unlock_duration",
            Self::RewardSharePercent => "reward_share_percent",
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
