//! The six-phase session ring.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernancePhase {
    /// Proposals may be added, paused, resumed or canceled.
    DraftStarted,
    DraftCompleted,
    /// Stakers may vote.
    VotingStarted,
    VotingCompleted,
    /// Votes are tallied against live stake.
    SnapshotStarted,
    /// Idle. Both the initial and the terminal phase of every session.
    SnapshotCompleted,
}

impl GovernancePhase {
    pub const INITIAL: Self = Self::SnapshotCompleted;

    /// The phase that follows this one on the ring.
    pub fn next(self) -> Self {
        match self {
            Self::SnapshotCompleted => Self::DraftStarted,
            Self::DraftStarted => Self::DraftCompleted,
            Self::DraftCompleted => Self::VotingStarted,
            Self::VotingStarted => Self::VotingCompleted,
            Self::VotingCompleted => Self::SnapshotStarted,
            Self::SnapshotStarted => Self::SnapshotCompleted,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DraftStarted => "DraftStarted",
            Self::DraftCompleted => "DraftCompleted",
            Self::VotingStarted => "VotingStarted",
            Self::VotingCompleted => "VotingCompleted",
            Self::SnapshotStarted => "SnapshotStarted",
            Self::SnapshotCompleted => "SnapshotCompleted",
        }
    }
}

impl Default for GovernancePhase {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for GovernancePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
