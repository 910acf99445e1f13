//! Governance proposals and their status lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Global proposal identifier. Nonzero, never reused.
pub type ProposalId = u64;

/// Status of a proposal.
///
/// `Active ↔ Paused` during a session; `Closed` and `Canceled` are terminal.
/// `None` is what status queries report for ids that were never added.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    None,
    Active,
    Paused,
    Closed,
    Canceled,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "None",
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Closed => "Closed",
            Self::Canceled => "Canceled",
        };
        f.write_str(s)
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub status: ProposalStatus,
    /// Tally from the most recent vote calculation. Kept after closing.
    pub vote_count: u64,
}

impl Proposal {
    pub fn new(id: ProposalId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            status: ProposalStatus::Active,
            vote_count: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProposalStatus::Active
    }

    pub fn is_paused(&self) -> bool {
        self.status == ProposalStatus::Paused
    }

    pub fn is_canceled(&self) -> bool {
        self.status == ProposalStatus::Canceled
    }
}
