//! Nullable infrastructure for deterministic testing.
//!
//! The ledger and the governance engine reach the outside world only
//! through `Timestamp` arguments, the `TokenLedger` trait and the
//! `StakeView` trait. This crate provides test-friendly stand-ins that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Keep everything in memory
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod stake_view;
pub mod token;

pub use clock::NullClock;
pub use stake_view::NullStakeView;
pub use token::NullToken;
