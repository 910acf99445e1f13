#![no_main]

use libfuzzer_sys::fuzz_target;

use tally_governance::GovernanceEngine;
use tally_nullables::NullToken;
use tally_staking::StakingLedger;

fuzz_target!(|data: &[u8]| {
    // Restoring from arbitrary bytes must fail cleanly, never panic.
    if let Ok(ledger) = StakingLedger::load_state(data, NullToken::new()) {
        let _ = ledger.save_state();
    }
    if let Ok(engine) = GovernanceEngine::load_state(data) {
        let _ = engine.current_proposals_count();
        let _ = engine.save_state();
    }
});
