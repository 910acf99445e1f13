use proptest::prelude::*;

use tally_governance::{GovernanceEngine, GovernancePhase};
use tally_nullables::NullStakeView;
use tally_types::AccountId;

/// Attempt the transition with the given index; 0..6 in ring order.
fn step(gov: &mut GovernanceEngine, owner: &AccountId, which: u8) -> bool {
    let result = match which {
        0 => gov.open_proposal_draft(owner),
        1 => gov.close_proposal_draft(owner),
        2 => gov.open_voting(owner),
        3 => gov.close_voting(owner),
        4 => gov.open_calculation(owner),
        _ => gov
            .calculate_votes(owner, &NullStakeView::new())
            .and_then(|()| gov.close_calculation(owner)),
    };
    result.is_ok()
}

proptest! {
    /// Random transition attempts only ever move one step along the ring,
    /// and the base index never shrinks.
    #[test]
    fn phase_moves_only_along_ring(
        attempts in prop::collection::vec(0u8..6, 1..200),
        add_at in prop::collection::vec(any::<bool>(), 200),
    ) {
        let owner = AccountId::new("owner");
        let mut gov = GovernanceEngine::new(owner.clone());
        let mut next_id = 1u64;
        let mut last_base = 0;

        for (i, which) in attempts.into_iter().enumerate() {
            let before = gov.phase();
            let moved = step(&mut gov, &owner, which);
            if moved {
                prop_assert_eq!(gov.phase(), before.next());
            } else {
                prop_assert_eq!(gov.phase(), before);
            }
            if gov.phase() == GovernancePhase::DraftStarted && add_at[i] {
                gov.add_proposal(&owner, next_id, "p").unwrap();
                next_id += 1;
            }
            prop_assert!(gov.base_index() >= last_base);
            prop_assert!(gov.base_index() <= gov.all_proposals().len());
            last_base = gov.base_index();
        }
    }
}
