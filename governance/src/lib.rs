//! Governance session machine.
//!
//! Sessions cycle through a six-phase ring:
//! SnapshotCompleted → DraftStarted → DraftCompleted → VotingStarted →
//! VotingCompleted → SnapshotStarted → SnapshotCompleted → …
//!
//! Proposals live in one append-only sequence; each session owns the window
//! `[base_index, len)` of it. Voter eligibility is never cached: it is read
//! from a `StakeView` when a vote is cast and again when votes are tallied.

pub mod engine;
pub mod error;
pub mod event;
pub mod phase;
pub mod proposal;

pub use engine::{GovernanceEngine, GovernanceState};
pub use error::GovernanceError;
pub use event::GovernanceEvent;
pub use phase::GovernancePhase;
pub use proposal::{Proposal, ProposalId, ProposalStatus};
