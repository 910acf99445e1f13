//! Staking ledger with scalable reward distribution.
//!
//! Every distribution bumps one global accumulator,
//! `reward_factor += stakers_share * SCALE / total_staked`, and each deposit
//! remembers the factor it last settled at. A deposit's reward is then
//! `amount * (reward_factor - snapshot) / SCALE`, which is O(1) per deposit
//! no matter how many distributions happened in between.
//!
//! This crate handles:
//! - Deposits into numbered per-account slots, incremental top-ups
//! - Reward settlement behind a maturity cliff
//! - Forced (fee-bearing) and requested (fee-free, time-windowed) withdrawals
//! - Delayed parameter changes and the events observers consume

pub mod config;
pub mod deposit;
pub mod error;
pub mod event;
pub mod ledger;
pub mod state;

pub use config::StakingConfig;
pub use deposit::{AccountDeposits, Deposit, DepositId};
pub use error::StakingError;
pub use event::StakingEvent;
pub use ledger::{LedgerState, StakingLedger};
pub use state::{Distribution, RewardState};
