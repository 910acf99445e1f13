//! Core governance engine: phase ring, proposal registry, votes, tally.

use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::phase::GovernancePhase;
use crate::proposal::{Proposal, ProposalId, ProposalStatus};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tally_types::{AccountId, EventLog, StakeView};
use tracing::{debug, info, warn};

/// Everything the engine persists. Serializable for snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceState {
    pub owner: AccountId,
    pub phase: GovernancePhase,
    /// First position of the current (or most recent) session's window.
    pub base_index: usize,
    pub paused: bool,
    /// Append-only; proposals are never removed.
    pub proposals: Vec<Proposal>,
    /// Proposal id → position in `proposals`, for every id ever added.
    pub positions: BTreeMap<ProposalId, usize>,
    /// Votes cast in the current session.
    pub votes: BTreeSet<(AccountId, ProposalId)>,
    /// Set once the current session's votes have been calculated.
    pub tallied: bool,
    /// Every winner ever found, in order.
    pub winners: Vec<ProposalId>,
}

/// The governance session machine.
///
/// Every state-changing call is privileged except `vote`, and every call
/// except `unpause` fails with `Paused` while the halt flag is set.
pub struct GovernanceEngine {
    state: GovernanceState,
    events: EventLog<GovernanceEvent>,
}

impl GovernanceEngine {
    pub fn new(owner: AccountId) -> Self {
        Self {
            state: GovernanceState {
                owner,
                phase: GovernancePhase::INITIAL,
                base_index: 0,
                paused: false,
                proposals: Vec::new(),
                positions: BTreeMap::new(),
                votes: BTreeSet::new(),
                tallied: false,
                winners: Vec::new(),
            },
            events: EventLog::new(),
        }
    }

    // ── Phase ring ─────────────────────────────────────────────────────

    /// Start a new session. The window begins at the current sequence end
    /// and the previous session's votes are discarded.
    pub fn open_proposal_draft(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.check_transition(caller, GovernancePhase::SnapshotCompleted)?;
        self.state.base_index = self.state.proposals.len();
        self.state.votes.clear();
        self.state.tallied = false;
        debug!(base_index = self.state.base_index, "new session window");
        self.advance();
        Ok(())
    }

    pub fn close_proposal_draft(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.check_transition(caller, GovernancePhase::DraftStarted)?;
        self.advance();
        Ok(())
    }

    pub fn open_voting(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.check_transition(caller, GovernancePhase::DraftCompleted)?;
        self.advance();
        Ok(())
    }

    pub fn close_voting(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.check_transition(caller, GovernancePhase::VotingStarted)?;
        self.advance();
        Ok(())
    }

    pub fn open_calculation(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.check_transition(caller, GovernancePhase::VotingCompleted)?;
        self.advance();
        Ok(())
    }

    /// Pick the winners of the window and close every proposal in it.
    ///
    /// All non-canceled proposals sharing the highest count win, ties
    /// included. Canceled proposals keep their status. Fails until
    /// [`calculate_votes`](Self::calculate_votes) has run this session.
    pub fn close_calculation(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.check_transition(caller, GovernancePhase::SnapshotStarted)?;
        if !self.state.tallied {
            return Err(GovernanceError::VotesNotCalculated);
        }

        let base = self.state.base_index;
        let max_count = self.state.proposals[base..]
            .iter()
            .filter(|p| !p.is_canceled())
            .map(|p| p.vote_count)
            .max();

        let mut staged = Vec::new();
        if let Some(max_count) = max_count {
            for proposal in self.state.proposals[base..].iter_mut() {
                if proposal.is_canceled() {
                    continue;
                }
                if proposal.vote_count == max_count {
                    self.state.winners.push(proposal.id);
                    staged.push(GovernanceEvent::WinnerFound {
                        proposal_id: proposal.id,
                        winners_count: self.state.winners.len() as u64,
                    });
                    info!(proposal_id = proposal.id, votes = max_count, "winner found");
                }
                proposal.status = ProposalStatus::Closed;
                staged.push(GovernanceEvent::ProposalStatusChanged {
                    proposal_id: proposal.id,
                    status: ProposalStatus::Closed,
                });
            }
        }
        self.events.commit(staged);
        self.advance();
        Ok(())
    }

    // ── Proposals ──────────────────────────────────────────────────────

    pub fn add_proposal(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        title: impl Into<String>,
    ) -> Result<(), GovernanceError> {
        self.check_privileged(caller)?;
        self.expect_phase(GovernancePhase::DraftStarted)?;
        if id == 0 {
            return Err(GovernanceError::InvalidParameter(
                "proposal id must be nonzero".into(),
            ));
        }
        if self.state.positions.contains_key(&id) {
            return Err(GovernanceError::DuplicateProposal(id));
        }
        let proposal = Proposal::new(id, title);
        let title = proposal.title.clone();
        self.state.positions.insert(id, self.state.proposals.len());
        self.state.proposals.push(proposal);
        debug!(proposal_id = id, %title, "proposal added");
        self.events
            .commit(vec![GovernanceEvent::ProposalAdded { proposal_id: id, title }]);
        Ok(())
    }

    pub fn pause_proposal(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
    ) -> Result<(), GovernanceError> {
        self.check_privileged(caller)?;
        let proposal = self.window_proposal_mut(id)?;
        if !proposal.is_active() {
            return Err(GovernanceError::ProposalNotActive(id));
        }
        proposal.status = ProposalStatus::Paused;
        self.status_changed(id, ProposalStatus::Paused);
        Ok(())
    }

    pub fn resume_proposal(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
    ) -> Result<(), GovernanceError> {
        self.check_privileged(caller)?;
        let proposal = self.window_proposal_mut(id)?;
        if !proposal.is_paused() {
            return Err(GovernanceError::ProposalNotPaused(id));
        }
        proposal.status = ProposalStatus::Active;
        self.status_changed(id, ProposalStatus::Active);
        Ok(())
    }

    /// Withdraw a proposal from the session. Its count drops to zero and
    /// it cannot win.
    pub fn cancel_proposal(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
    ) -> Result<(), GovernanceError> {
        self.check_privileged(caller)?;
        let proposal = self.window_proposal_mut(id)?;
        if !(proposal.is_active() || proposal.is_paused()) {
            return Err(GovernanceError::ProposalNotActive(id));
        }
        proposal.status = ProposalStatus::Canceled;
        proposal.vote_count = 0;
        self.status_changed(id, ProposalStatus::Canceled);
        Ok(())
    }

    // ── Voting ─────────────────────────────────────────────────────────

    /// Record `caller`'s vote for proposal `id`.
    ///
    /// `stakes` is consulted for eligibility now and again at tally time.
    pub fn vote(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        stakes: &dyn StakeView,
    ) -> Result<(), GovernanceError> {
        self.check_not_paused()?;
        self.expect_phase(GovernancePhase::VotingStarted)?;
        let proposal = self.window_proposal(id)?;
        if !proposal.is_active() {
            return Err(GovernanceError::ProposalNotActive(id));
        }
        if stakes.total_user_balance(caller) == 0 {
            return Err(GovernanceError::NotEligible(caller.clone()));
        }
        let key = (caller.clone(), id);
        if self.state.votes.contains(&key) {
            return Err(GovernanceError::AlreadyVoted {
                voter: caller.clone(),
                proposal_id: id,
            });
        }
        self.state.votes.insert(key);
        debug!(voter = %caller, proposal_id = id, "vote added");
        self.events.commit(vec![GovernanceEvent::VoteAdded {
            proposal_id: id,
            voter: caller.clone(),
        }]);
        Ok(())
    }

    /// Tally the session's votes against stake as it is now.
    ///
    /// Counts are rebuilt from scratch on every call. Voters whose stake has
    /// dropped to zero since voting are skipped, as are canceled proposals.
    pub fn calculate_votes(
        &mut self,
        caller: &AccountId,
        stakes: &dyn StakeView,
    ) -> Result<(), GovernanceError> {
        self.check_privileged(caller)?;
        self.expect_phase(GovernancePhase::SnapshotStarted)?;

        let base = self.state.base_index;
        let length = self.state.proposals.len();
        let mut counts: BTreeMap<ProposalId, u64> = BTreeMap::new();
        let mut dropped = 0usize;
        for (voter, id) in &self.state.votes {
            if stakes.total_user_balance(voter) == 0 {
                dropped += 1;
                continue;
            }
            *counts.entry(*id).or_default() += 1;
        }
        for proposal in self.state.proposals[base..].iter_mut() {
            proposal.vote_count = if proposal.is_canceled() {
                0
            } else {
                counts.get(&proposal.id).copied().unwrap_or(0)
            };
        }

        self.state.tallied = true;
        if dropped > 0 {
            warn!(dropped, "votes from accounts without stake ignored");
        }
        info!(base_index = base, length, votes = self.state.votes.len() - dropped, "votes calculated");
        self.events.commit(vec![
            GovernanceEvent::CalculationHasStarted {
                base_index: base as u64,
                length: length as u64,
            },
            GovernanceEvent::CalculationHasCompleted {
                sender: caller.clone(),
            },
        ]);
        Ok(())
    }

    // ── Halt switch ────────────────────────────────────────────────────

    pub fn pause(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.check_privileged(caller)?;
        self.state.paused = true;
        info!(sender = %caller, "governance paused");
        self.events.commit(vec![GovernanceEvent::Paused {
            sender: caller.clone(),
        }]);
        Ok(())
    }

    pub fn unpause(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.check_owner(caller)?;
        if !self.state.paused {
            return Err(GovernanceError::NotPaused);
        }
        self.state.paused = false;
        info!(sender = %caller, "governance unpaused");
        self.events.commit(vec![GovernanceEvent::Unpaused {
            sender: caller.clone(),
        }]);
        Ok(())
    }

    // ── Views ──────────────────────────────────────────────────────────

    pub fn owner(&self) -> &AccountId {
        &self.state.owner
    }

    pub fn phase(&self) -> GovernancePhase {
        self.state.phase
    }

    pub fn base_index(&self) -> usize {
        self.state.base_index
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    /// Proposals of the current session, in insertion order.
    pub fn current_proposals(&self) -> &[Proposal] {
        &self.state.proposals[self.state.base_index..]
    }

    pub fn current_proposals_count(&self) -> usize {
        self.current_proposals().len()
    }

    pub fn active_proposals_count(&self) -> usize {
        self.current_proposals()
            .iter()
            .filter(|p| p.is_active())
            .count()
    }

    pub fn paused_proposals_count(&self) -> usize {
        self.current_proposals()
            .iter()
            .filter(|p| p.is_paused())
            .count()
    }

    /// Every proposal ever added, closed ones included.
    pub fn all_proposals(&self) -> &[Proposal] {
        &self.state.proposals
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        let pos = *self.state.positions.get(&id)?;
        self.state.proposals.get(pos)
    }

    /// Status of any proposal; `None` for ids never added.
    pub fn proposal_status(&self, id: ProposalId) -> ProposalStatus {
        self.proposal(id).map_or(ProposalStatus::None, |p| p.status)
    }

    /// Last tallied count of any proposal; 0 for ids never added.
    pub fn get_result(&self, id: ProposalId) -> u64 {
        self.proposal(id).map_or(0, |p| p.vote_count)
    }

    pub fn has_voted(&self, voter: &AccountId, id: ProposalId) -> bool {
        self.state.votes.contains(&(voter.clone(), id))
    }

    /// Number of votes cast in the current session.
    pub fn votes_cast(&self) -> usize {
        self.state.votes.len()
    }

    pub fn winners(&self) -> &[ProposalId] {
        &self.state.winners
    }

    pub fn events(&self) -> &EventLog<GovernanceEvent> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog<GovernanceEvent> {
        &mut self.events
    }

    /// Register a listener called for every committed event.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn state(&self) -> &GovernanceState {
        &self.state
    }

    // ── Persistence ────────────────────────────────────────────────────

    /// Serialize the engine state. The event log is not included.
    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(&self.state).map_err(|e| GovernanceError::Snapshot(e.to_string()))
    }

    /// Restore an engine from [`save_state`](Self::save_state) bytes.
    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        let state: GovernanceState =
            bincode::deserialize(data).map_err(|e| GovernanceError::Snapshot(e.to_string()))?;
        if state.base_index > state.proposals.len() {
            return Err(GovernanceError::Snapshot(
                "base index beyond proposal sequence".into(),
            ));
        }
        Ok(Self {
            state,
            events: EventLog::new(),
        })
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn check_owner(&self, caller: &AccountId) -> Result<(), GovernanceError> {
        if *caller != self.state.owner {
            warn!(caller = %caller, "privileged call rejected");
            return Err(GovernanceError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    fn check_not_paused(&self) -> Result<(), GovernanceError> {
        if self.state.paused {
            return Err(GovernanceError::Paused);
        }
        Ok(())
    }

    fn check_privileged(&self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.check_owner(caller)?;
        self.check_not_paused()
    }

    fn expect_phase(&self, expected: GovernancePhase) -> Result<(), GovernanceError> {
        if self.state.phase != expected {
            return Err(GovernanceError::InvalidPhase {
                expected,
                actual: self.state.phase,
            });
        }
        Ok(())
    }

    fn check_transition(
        &self,
        caller: &AccountId,
        from: GovernancePhase,
    ) -> Result<(), GovernanceError> {
        self.check_privileged(caller)?;
        self.expect_phase(from)
    }

    /// Step to the next phase on the ring.
    fn advance(&mut self) {
        let from = self.state.phase;
        let to = from.next();
        self.state.phase = to;
        info!(%from, %to, "governance phase changed");
        self.events
            .commit(vec![GovernanceEvent::PhaseChanged { from, to }]);
    }

    fn window_position(&self, id: ProposalId) -> Result<usize, GovernanceError> {
        match self.state.positions.get(&id) {
            Some(&pos) if pos >= self.state.base_index => Ok(pos),
            _ => Err(GovernanceError::ProposalNotFound(id)),
        }
    }

    fn window_proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        let pos = self.window_position(id)?;
        self.state
            .proposals
            .get(pos)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    fn window_proposal_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, GovernanceError> {
        let pos = self.window_position(id)?;
        self.state
            .proposals
            .get_mut(pos)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    fn status_changed(&mut self, id: ProposalId, status: ProposalStatus) {
        debug!(proposal_id = id, %status, "proposal status changed");
        self.events
            .commit(vec![GovernanceEvent::ProposalStatusChanged {
                proposal_id: id,
                status,
            }]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_nullables::NullStakeView;

    fn owner() -> AccountId {
        AccountId::new("owner")
    }

    fn voter(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn stakers() -> NullStakeView {
        NullStakeView::new()
            .with("v1", 10)
            .with("v2", 20)
            .with("v3", 30)
    }

    /// Engine in `DraftStarted` with proposals 100, 200, 300.
    fn drafted() -> GovernanceEngine {
        let mut g = GovernanceEngine::new(owner());
        g.open_proposal_draft(&owner()).unwrap();
        for id in [100, 200, 300] {
            g.add_proposal(&owner(), id, format!("proposal {id}")).unwrap();
        }
        g
    }

    fn to_voting(g: &mut GovernanceEngine) {
        g.close_proposal_draft(&owner()).unwrap();
        g.open_voting(&owner()).unwrap();
    }

    fn to_calculation(g: &mut GovernanceEngine) {
        g.close_voting(&owner()).unwrap();
        g.open_calculation(&owner()).unwrap();
    }

    /// Tally against `stakes` and close the calculation phase.
    fn conclude(g: &mut GovernanceEngine, stakes: &NullStakeView) {
        g.calculate_votes(&owner(), stakes).unwrap();
        g.close_calculation(&owner()).unwrap();
    }

    fn full_cycle(g: &mut GovernanceEngine) {
        g.open_proposal_draft(&owner()).unwrap();
        to_voting(g);
        to_calculation(g);
        conclude(g, &NullStakeView::new());
    }

    #[test]
    fn test_initial_state() {
        let g = GovernanceEngine::new(owner());
        assert_eq!(g.phase(), GovernancePhase::SnapshotCompleted);
        assert_eq!(g.base_index(), 0);
        assert_eq!(g.current_proposals_count(), 0);
        assert!(!g.is_paused());
    }

    #[test]
    fn test_phase_ring_is_repeatable() {
        let mut g = GovernanceEngine::new(owner());
        for _ in 0..3 {
            full_cycle(&mut g);
            assert_eq!(g.phase(), GovernancePhase::SnapshotCompleted);
        }
    }

    #[test]
    fn test_out_of_order_transition_fails() {
        let mut g = GovernanceEngine::new(owner());
        let err = g.open_voting(&owner()).unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::InvalidPhase {
                expected: GovernancePhase::DraftCompleted,
                actual: GovernancePhase::SnapshotCompleted,
            }
        ));
        assert!(g.close_calculation(&owner()).is_err());
        assert!(g.close_proposal_draft(&owner()).is_err());
        g.open_proposal_draft(&owner()).unwrap();
        assert!(g.open_proposal_draft(&owner()).is_err());
    }

    #[test]
    fn test_transitions_require_owner() {
        let mut g = GovernanceEngine::new(owner());
        assert!(matches!(
            g.open_proposal_draft(&voter("v1")),
            Err(GovernanceError::Unauthorized(_))
        ));
        assert_eq!(g.phase(), GovernancePhase::SnapshotCompleted);
    }

    #[test]
    fn test_base_index_tracks_sequence_length() {
        let mut g = drafted();
        assert_eq!(g.base_index(), 0);
        to_voting(&mut g);
        to_calculation(&mut g);
        conclude(&mut g, &NullStakeView::new());
        assert_eq!(g.base_index(), 0);
        g.open_proposal_draft(&owner()).unwrap();
        assert_eq!(g.base_index(), 3);
        assert_eq!(g.current_proposals_count(), 0);
    }

    #[test]
    fn test_proposal_counts() {
        let mut g = drafted();
        assert_eq!(g.current_proposals_count(), 3);
        assert_eq!(g.active_proposals_count(), 3);
        g.pause_proposal(&owner(), 100).unwrap();
        assert_eq!(g.paused_proposals_count(), 1);
        assert_eq!(g.active_proposals_count(), 2);
        assert_eq!(g.current_proposals_count(), 3);
        g.resume_proposal(&owner(), 100).unwrap();
        assert_eq!(g.paused_proposals_count(), 0);
        assert_eq!(g.active_proposals_count(), 3);
    }

    #[test]
    fn test_add_proposal_validation() {
        let mut g = drafted();
        assert!(matches!(
            g.add_proposal(&owner(), 0, "zero"),
            Err(GovernanceError::InvalidParameter(_))
        ));
        assert!(matches!(
            g.add_proposal(&owner(), 100, "again"),
            Err(GovernanceError::DuplicateProposal(100))
        ));
        assert!(matches!(
            g.add_proposal(&voter("v1"), 400, "intruder"),
            Err(GovernanceError::Unauthorized(_))
        ));
        g.close_proposal_draft(&owner()).unwrap();
        assert!(matches!(
            g.add_proposal(&owner(), 400, "late"),
            Err(GovernanceError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn test_ids_stay_unique_across_sessions() {
        let mut g = drafted();
        to_voting(&mut g);
        to_calculation(&mut g);
        conclude(&mut g, &NullStakeView::new());
        g.open_proposal_draft(&owner()).unwrap();
        assert!(matches!(
            g.add_proposal(&owner(), 200, "recycled"),
            Err(GovernanceError::DuplicateProposal(200))
        ));
    }

    #[test]
    fn test_pause_resume_errors() {
        let mut g = drafted();
        assert!(matches!(
            g.resume_proposal(&owner(), 100),
            Err(GovernanceError::ProposalNotPaused(100))
        ));
        g.pause_proposal(&owner(), 100).unwrap();
        assert!(matches!(
            g.pause_proposal(&owner(), 100),
            Err(GovernanceError::ProposalNotActive(100))
        ));
        assert!(matches!(
            g.pause_proposal(&owner(), 999),
            Err(GovernanceError::ProposalNotFound(999))
        ));
    }

    #[test]
    fn test_previous_session_proposals_are_out_of_window() {
        let mut g = drafted();
        to_voting(&mut g);
        to_calculation(&mut g);
        conclude(&mut g, &NullStakeView::new());
        g.open_proposal_draft(&owner()).unwrap();
        assert!(matches!(
            g.pause_proposal(&owner(), 100),
            Err(GovernanceError::ProposalNotFound(100))
        ));
    }

    #[test]
    fn test_vote_and_tally_single_winner() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        for v in ["v1", "v2", "v3"] {
            g.vote(&voter(v), 100, &stakes).unwrap();
        }
        g.vote(&voter("v1"), 200, &stakes).unwrap();
        to_calculation(&mut g);
        g.calculate_votes(&owner(), &stakes).unwrap();
        assert_eq!(g.get_result(100), 3);
        assert_eq!(g.get_result(200), 1);
        assert_eq!(g.get_result(300), 0);

        g.close_calculation(&owner()).unwrap();
        assert_eq!(g.winners(), &[100]);
        assert!(g
            .events()
            .records()
            .contains(&GovernanceEvent::WinnerFound {
                proposal_id: 100,
                winners_count: 1,
            }));
        for id in [100, 200, 300] {
            assert_eq!(g.proposal_status(id), ProposalStatus::Closed);
        }
        assert_eq!(g.get_result(100), 3);
    }

    #[test]
    fn test_calculation_events_in_order() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        to_calculation(&mut g);
        g.calculate_votes(&owner(), &stakes).unwrap();
        let records = g.events().records();
        let n = records.len();
        assert_eq!(
            records[n - 2],
            GovernanceEvent::CalculationHasStarted {
                base_index: 0,
                length: 3,
            }
        );
        assert_eq!(
            records[n - 1],
            GovernanceEvent::CalculationHasCompleted { sender: owner() }
        );
    }

    #[test]
    fn test_ties_all_win() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        g.vote(&voter("v1"), 100, &stakes).unwrap();
        g.vote(&voter("v2"), 300, &stakes).unwrap();
        to_calculation(&mut g);
        g.calculate_votes(&owner(), &stakes).unwrap();
        g.close_calculation(&owner()).unwrap();
        assert_eq!(g.winners(), &[100, 300]);
    }

    #[test]
    fn test_vote_rules() {
        let stakes = stakers();
        let mut g = drafted();
        assert!(matches!(
            g.vote(&voter("v1"), 100, &stakes),
            Err(GovernanceError::InvalidPhase { .. })
        ));
        g.pause_proposal(&owner(), 200).unwrap();
        to_voting(&mut g);

        assert!(matches!(
            g.vote(&voter("nobody"), 100, &stakes),
            Err(GovernanceError::NotEligible(_))
        ));
        assert!(matches!(
            g.vote(&voter("v1"), 200, &stakes),
            Err(GovernanceError::ProposalNotActive(200))
        ));
        assert!(matches!(
            g.vote(&voter("v1"), 999, &stakes),
            Err(GovernanceError::ProposalNotFound(999))
        ));
        g.vote(&voter("v1"), 100, &stakes).unwrap();
        assert!(matches!(
            g.vote(&voter("v1"), 100, &stakes),
            Err(GovernanceError::AlreadyVoted { .. })
        ));
        g.vote(&voter("v1"), 300, &stakes).unwrap();
        assert!(g.has_voted(&voter("v1"), 300));
        assert_eq!(g.votes_cast(), 2);
    }

    #[test]
    fn test_tally_rechecks_stake() {
        let mut stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        for v in ["v1", "v2", "v3"] {
            g.vote(&voter(v), 100, &stakes).unwrap();
        }
        stakes.clear(&voter("v2"));
        to_calculation(&mut g);
        g.calculate_votes(&owner(), &stakes).unwrap();
        assert_eq!(g.get_result(100), 2);
    }

    #[test]
    fn test_calculate_votes_is_idempotent() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        g.vote(&voter("v1"), 100, &stakes).unwrap();
        to_calculation(&mut g);
        g.calculate_votes(&owner(), &stakes).unwrap();
        g.calculate_votes(&owner(), &stakes).unwrap();
        assert_eq!(g.get_result(100), 1);
    }

    #[test]
    fn test_canceled_proposal_never_wins() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        g.vote(&voter("v1"), 100, &stakes).unwrap();
        g.vote(&voter("v2"), 100, &stakes).unwrap();
        g.vote(&voter("v3"), 200, &stakes).unwrap();
        g.cancel_proposal(&owner(), 100).unwrap();
        assert!(matches!(
            g.cancel_proposal(&owner(), 100),
            Err(GovernanceError::ProposalNotActive(100))
        ));
        to_calculation(&mut g);
        g.calculate_votes(&owner(), &stakes).unwrap();
        assert_eq!(g.get_result(100), 0);
        g.close_calculation(&owner()).unwrap();
        assert_eq!(g.winners(), &[200]);
        assert_eq!(g.proposal_status(100), ProposalStatus::Canceled);
        assert_eq!(g.proposal_status(300), ProposalStatus::Closed);
    }

    #[test]
    fn test_close_calculation_requires_tally() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        for v in ["v1", "v2", "v3"] {
            g.vote(&voter(v), 100, &stakes).unwrap();
        }
        to_calculation(&mut g);
        assert!(matches!(
            g.close_calculation(&owner()),
            Err(GovernanceError::VotesNotCalculated)
        ));
        assert_eq!(g.phase(), GovernancePhase::SnapshotStarted);
        assert!(g.winners().is_empty());
        assert_eq!(g.proposal_status(200), ProposalStatus::Active);

        conclude(&mut g, &stakes);
        assert_eq!(g.winners(), &[100]);
    }

    #[test]
    fn test_tally_flag_resets_each_session() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        g.vote(&voter("v1"), 100, &stakes).unwrap();
        to_calculation(&mut g);
        conclude(&mut g, &stakes);

        g.open_proposal_draft(&owner()).unwrap();
        g.add_proposal(&owner(), 400, "next").unwrap();
        to_voting(&mut g);
        g.vote(&voter("v2"), 400, &stakes).unwrap();
        to_calculation(&mut g);
        assert!(matches!(
            g.close_calculation(&owner()),
            Err(GovernanceError::VotesNotCalculated)
        ));
    }

    #[test]
    fn test_cancel_after_tally_drops_count() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        for v in ["v1", "v2", "v3"] {
            g.vote(&voter(v), 100, &stakes).unwrap();
        }
        g.vote(&voter("v1"), 200, &stakes).unwrap();
        to_calculation(&mut g);
        g.calculate_votes(&owner(), &stakes).unwrap();
        assert_eq!(g.get_result(100), 3);

        g.cancel_proposal(&owner(), 100).unwrap();
        assert_eq!(g.get_result(100), 0);
        g.close_calculation(&owner()).unwrap();
        assert_eq!(g.proposal_status(100), ProposalStatus::Canceled);
        assert_eq!(g.get_result(100), 0);
        assert_eq!(g.winners(), &[200]);
    }

    #[test]
    fn test_empty_session_has_no_winner() {
        let mut g = GovernanceEngine::new(owner());
        full_cycle(&mut g);
        assert!(g.winners().is_empty());
    }

    #[test]
    fn test_votes_cleared_on_next_draft() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        g.vote(&voter("v1"), 100, &stakes).unwrap();
        to_calculation(&mut g);
        conclude(&mut g, &stakes);
        assert_eq!(g.votes_cast(), 1);
        g.open_proposal_draft(&owner()).unwrap();
        assert_eq!(g.votes_cast(), 0);
    }

    #[test]
    fn test_pause_blocks_everything_but_unpause() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        g.pause(&owner()).unwrap();
        assert!(matches!(g.pause(&owner()), Err(GovernanceError::Paused)));
        assert!(matches!(
            g.vote(&voter("v1"), 100, &stakes),
            Err(GovernanceError::Paused)
        ));
        assert!(matches!(g.close_voting(&owner()), Err(GovernanceError::Paused)));
        assert!(matches!(
            g.pause_proposal(&owner(), 100),
            Err(GovernanceError::Paused)
        ));
        assert!(matches!(
            g.unpause(&voter("v1")),
            Err(GovernanceError::Unauthorized(_))
        ));
        g.unpause(&owner()).unwrap();
        assert!(matches!(g.unpause(&owner()), Err(GovernanceError::NotPaused)));
        g.vote(&voter("v1"), 100, &stakes).unwrap();
    }

    #[test]
    fn test_unknown_proposal_views() {
        let g = drafted();
        assert_eq!(g.proposal_status(42), ProposalStatus::None);
        assert_eq!(g.get_result(42), 0);
        assert!(g.proposal(42).is_none());
    }

    #[test]
    fn test_phase_changes_are_logged() {
        let mut g = GovernanceEngine::new(owner());
        g.open_proposal_draft(&owner()).unwrap();
        assert_eq!(
            g.events().last(),
            Some(&GovernanceEvent::PhaseChanged {
                from: GovernancePhase::SnapshotCompleted,
                to: GovernancePhase::DraftStarted,
            })
        );
    }

    #[test]
    fn test_save_and_load_state() {
        let stakes = stakers();
        let mut g = drafted();
        to_voting(&mut g);
        g.vote(&voter("v1"), 100, &stakes).unwrap();
        g.pause(&owner()).unwrap();

        let bytes = g.save_state().unwrap();
        let restored = GovernanceEngine::load_state(&bytes).unwrap();
        assert_eq!(restored.state(), g.state());
        assert!(restored.is_paused());
        assert!(restored.has_voted(&voter("v1"), 100));
        assert!(restored.events().is_empty());
    }

    #[test]
    fn test_load_state_rejects_garbage() {
        assert!(matches!(
            GovernanceEngine::load_state(&[0xff; 4]),
            Err(GovernanceError::Snapshot(_))
        ));
    }
}
