//! Reference scenarios run against in-memory collaborators.

use anyhow::Result;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tally_governance::{GovernanceEngine, GovernanceEvent};
use tally_nullables::{NullClock, NullToken};
use tally_staking::{StakingConfig, StakingEvent, StakingLedger};
use tally_types::{AccountId, SCALE};
use tracing::{info, warn};

const VOTERS: [&str; 3] = ["alice", "bob", "carol"];

#[derive(Serialize)]
struct EventLine<'a, E> {
    source: &'static str,
    event: &'a E,
}

type Sink = Arc<Mutex<Vec<String>>>;

fn record<E: Serialize>(sink: &Sink, source: &'static str, event: &E) {
    match serde_json::to_string(&EventLine { source, event }) {
        Ok(line) => {
            if let Ok(mut lines) = sink.lock() {
                lines.push(line);
            }
        }
        Err(e) => warn!(error = %e, "event could not be serialized"),
    }
}

/// Run both scenarios and return every committed event as a JSON line,
/// in commit order.
pub fn run(config: &StakingConfig) -> Result<Vec<String>> {
    let sink: Sink = Arc::new(Mutex::new(Vec::new()));
    let clock = NullClock::default();

    let mut token = NullToken::new();
    token.fund(&config.owner, &config.custody, 1_000_000 * SCALE);
    for v in VOTERS {
        token.fund(&AccountId::new(v), &config.custody, 1_000 * SCALE);
    }
    let mut ledger = StakingLedger::new(config, token)?;
    let mut gov = GovernanceEngine::new(config.owner.clone());

    let staking_sink = Arc::clone(&sink);
    ledger.subscribe(Box::new(move |e: &StakingEvent| record(&staking_sink, "staking", e)));
    let gov_sink = Arc::clone(&sink);
    gov.subscribe(Box::new(move |e: &GovernanceEvent| record(&gov_sink, "governance", e)));

    reward_scenario(&mut ledger, &clock)?;
    governance_scenario(&mut ledger, &mut gov, &clock)?;

    let lines = sink
        .lock()
        .map(|lines| lines.clone())
        .map_err(|_| anyhow::anyhow!("event sink poisoned"))?;
    info!(events = lines.len(), "simulation finished");
    Ok(lines)
}

/// A sole staker collects a matured reward through a fee-free withdrawal.
fn reward_scenario(ledger: &mut StakingLedger<NullToken>, clock: &NullClock) -> Result<()> {
    let alice = AccountId::new("alice");
    let owner = ledger.owner().clone();

    let id = ledger.deposit(&alice, 100 * SCALE, clock.now())?;
    ledger.distribute(&owner, 200 * SCALE, clock.now())?;

    let lock = ledger.withdrawal_lock_duration(clock.now());
    clock.advance(ledger.reward_maturity_duration().saturating_sub(lock));
    ledger.request_withdrawal(&alice, id, clock.now())?;
    clock.advance(lock);
    let sum = ledger.make_requested_withdrawal(&alice, id, clock.now())?;

    info!(withdrawal_sum = sum, "reward scenario complete");
    Ok(())
}

/// Three stakers elect one of three proposals.
fn governance_scenario(
    ledger: &mut StakingLedger<NullToken>,
    gov: &mut GovernanceEngine,
    clock: &NullClock,
) -> Result<()> {
    let owner = gov.owner().clone();
    for v in VOTERS {
        ledger.deposit(&AccountId::new(v), 10 * SCALE, clock.now())?;
    }

    gov.open_proposal_draft(&owner)?;
    for id in [100, 200, 300] {
        gov.add_proposal(&owner, id, format!("proposal {id}"))?;
    }
    gov.pause_proposal(&owner, 100)?;
    gov.resume_proposal(&owner, 100)?;
    gov.close_proposal_draft(&owner)?;
    gov.open_voting(&owner)?;
    for v in VOTERS {
        gov.vote(&AccountId::new(v), 100, &*ledger)?;
    }
    gov.close_voting(&owner)?;
    gov.open_calculation(&owner)?;
    gov.calculate_votes(&owner, &*ledger)?;
    gov.close_calculation(&owner)?;

    info!(winners = ?gov.winners(), "governance scenario complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_simulation_emits_expected_events() {
        let lines = run(&StakingConfig::default()).unwrap();
        assert!(lines[0].contains("\"source\":\"staking\""));
        assert!(lines[0].contains("Deposited"));
        assert!(lines
            .iter()
            .any(|l| l.contains("Withdrawn") && l.contains("\"withdrawal_sum\":150000000000000000000")));
        assert!(lines
            .iter()
            .any(|l| l.contains("WinnerFound") && l.contains("\"proposal_id\":100")));
        assert!(lines.iter().all(|l| l.starts_with('{') && l.ends_with('}')));
    }
}
