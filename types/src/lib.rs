//! Fundamental types shared by the staking ledger and the governance engine.
//!
//! Account identifiers, timestamps, the 1e18 fixed-point `Ratio`, and the two
//! collaborator seams: `TokenLedger` (the trusted transfer primitive) and
//! `StakeView` (the eligibility query governance runs against staking).

pub mod account;
pub mod event_log;
pub mod ratio;
pub mod stake_view;
pub mod time;
pub mod token;

pub use account::AccountId;
pub use event_log::EventLog;
pub use ratio::{mul_div, Ratio, RatioParseError, SCALE};
pub use stake_view::StakeView;
pub use time::{Timestamp, DAY, HOUR, WEEK};
pub use token::{TokenError, TokenLedger};
