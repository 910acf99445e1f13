//! Events emitted by the governance engine.

use crate::phase::GovernancePhase;
use crate::proposal::{ProposalId, ProposalStatus};
use serde::{Deserialize, Serialize};
use tally_types::AccountId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    PhaseChanged {
        from: GovernancePhase,
        to: GovernancePhase,
    },
    ProposalAdded {
        proposal_id: ProposalId,
        title: String,
    },
    ProposalStatusChanged {
        proposal_id: ProposalId,
        status: ProposalStatus,
    },
    VoteAdded {
        proposal_id: ProposalId,
        voter: AccountId,
    },
    CalculationHasStarted {
        base_index: u64,
        length: u64,
    },
    CalculationHasCompleted {
        sender: AccountId,
    },
    WinnerFound {
        proposal_id: ProposalId,
        /// Number of winners found across all sessions so far.
        winners_count: u64,
    },
    Paused {
        sender: AccountId,
    },
    Unpaused {
        sender: AccountId,
    },
}

impl GovernanceEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PhaseChanged { .. } => "PhaseChanged",
            Self::ProposalAdded { .. } => "ProposalAdded",
            Self::ProposalStatusChanged { .. } => "ProposalStatusChanged",
            Self::VoteAdded { .. } => "VoteAdded",
            Self::CalculationHasStarted { .. } => "CalculationHasStarted",
            Self::CalculationHasCompleted { .. } => "CalculationHasCompleted",
            Self::WinnerFound { .. } => "WinnerFound",
            Self::Paused { .. } => "Paused",
            Self::Unpaused { .. } => "Unpaused",
        }
    }
}
