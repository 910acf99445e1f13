//! Delayed parameter store.
//!
//! Economic parameters are changed in two phases: a setter schedules the new
//! value, and reads keep returning the old one until `PARAM_UPDATE_DELAY`
//! (7 days) has passed. There is no timer; the switch is a comparison made
//! on every read.

pub mod delayed;
pub mod error;
pub mod kind;
pub mod staking_params;

pub use delayed::{DelayedParam, PARAM_UPDATE_DELAY};
pub use error::ParamError;
pub use kind::ParamKind;
pub use staking_params::{
    StakingParams, MAX_WITHDRAWAL_LOCK_DURATION, MIN_WITHDRAWAL_UNLOCK_DURATION,
};
