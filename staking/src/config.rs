//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use tally_params::StakingParams;
use tally_types::{AccountId, Ratio, DAY, HOUR};

use crate::StakingError;

/// Initial configuration of a [`StakingLedger`](crate::StakingLedger).
///
/// Parameter values here seed the delayed parameter store; later changes go
/// through the owner setters and wait out the update delay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakingConfig {
    /// Account allowed to distribute rewards and change parameters.
    #[serde(default = "default_owner")]
    pub owner: AccountId,

    /// Account that holds staked tokens on the ledger's behalf.
    #[serde(default = "default_custody")]
    pub custody: AccountId,

    /// Forced-withdrawal fee, as a fraction of the withdrawn amount.
    #[serde(default = "default_fee")]
    pub fee: Ratio,

    /// Seconds after a request before a fee-free withdrawal opens.
    #[serde(default = "default_withdrawal_lock_duration")]
    pub withdrawal_lock_duration: u64,

    /// Seconds the fee-free window stays open once the lock has passed.
    #[serde(default = "default_withdrawal_unlock_duration")]
    pub withdrawal_unlock_duration: u64,

    /// Age a deposit must reach before it earns anything. Fixed for the
    /// lifetime of the ledger.
    #[serde(default = "default_reward_maturity_duration")]
    pub reward_maturity_duration: u64,

    /// Stakers' fraction of each distribution; the owner keeps the rest.
    #[serde(default = "default_reward_share_percent")]
    pub reward_share_percent: Ratio,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_owner() -> AccountId {
    AccountId::new("owner")
}

fn default_custody() -> AccountId {
    AccountId::new("staking-ledger")
}

fn default_fee() -> Ratio {
    Ratio::from_percent(3)
}

fn default_withdrawal_lock_duration() -> u64 {
    HOUR
}

fn default_withdrawal_unlock_duration() -> u64 {
    HOUR
}

fn default_reward_maturity_duration() -> u64 {
    14 * DAY
}

fn default_reward_share_percent() -> Ratio {
    Ratio::from_percent(25)
}

// ── Impl ───────────────────────────────────────────────────────────────

impl StakingConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, StakingError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| StakingError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, StakingError> {
        toml::from_str(s).map_err(|e| StakingError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, StakingError> {
        toml::to_string_pretty(self).map_err(|e| StakingError::Config(e.to_string()))
    }

    /// Check accounts and parameter bounds without building a ledger.
    pub fn validate(&self) -> Result<(), StakingError> {
        if !self.owner.is_valid() {
            return Err(StakingError::InvalidParameter(
                "owner account must not be empty".into(),
            ));
        }
        if !self.custody.is_valid() {
            return Err(StakingError::InvalidParameter(
                "custody account must not be empty".into(),
            ));
        }
        if self.owner == self.custody {
            return Err(StakingError::InvalidParameter(
                "owner and custody accounts must differ".into(),
            ));
        }
        self.params().map(|_| ())
    }

    /// Seed a delayed parameter store from this configuration.
    pub fn params(&self) -> Result<StakingParams, StakingError> {
        Ok(StakingParams::new(
            self.fee,
            self.withdrawal_lock_duration,
            self.withdrawal_unlock_duration,
            self.reward_share_percent,
        )?)
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            custody: default_custody(),
            fee: default_fee(),
            withdrawal_lock_duration: default_withdrawal_lock_duration(),
            withdrawal_unlock_duration: default_withdrawal_unlock_duration(),
            reward_maturity_duration: default_reward_maturity_duration(),
            reward_share_percent: default_reward_share_percent(),
        }
    }
}
