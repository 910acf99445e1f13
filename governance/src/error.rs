use crate::phase::GovernancePhase;
use crate::proposal::ProposalId;
use tally_types::AccountId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("caller {0} is not the owner")]
    Unauthorized(AccountId),

    #[error("invalid phase: expected {expected}, currently {actual}")]
    InvalidPhase {
        expected: GovernancePhase,
        actual: GovernancePhase,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("proposal {0} already exists")]
    DuplicateProposal(ProposalId),

    #[error("proposal {0} not found in the current session")]
    ProposalNotFound(ProposalId),

    #[error("proposal {0} is not active")]
    ProposalNotActive(ProposalId),

    #[error("proposal {0} is not paused")]
    ProposalNotPaused(ProposalId),

    #[error("account {0} has no stake and cannot vote")]
    NotEligible(AccountId),

    #[error("account {voter} has already voted for proposal {proposal_id}")]
    AlreadyVoted {
        voter: AccountId,
        proposal_id: ProposalId,
    },

    #[error("votes have not been calculated for this session")]
    VotesNotCalculated,

    #[error("governance is paused")]
    Paused,

    #[error("governance is not paused")]
    NotPaused,

    #[error("snapshot error: {0}")]
    Snapshot(String),
}
