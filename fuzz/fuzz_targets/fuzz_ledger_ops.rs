#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tally_nullables::NullToken;
use tally_staking::{StakingConfig, StakingLedger};
use tally_types::{AccountId, Timestamp, TokenLedger};

#[derive(Arbitrary, Debug)]
enum Op {
    Deposit { who: u8, amount: u64 },
    TopUp { who: u8, id: u8, amount: u64 },
    Forced { who: u8, id: u8 },
    Request { who: u8, id: u8 },
    Requested { who: u8, id: u8 },
    Distribute { amount: u64 },
    Advance { secs: u32 },
}

fn account(who: u8) -> AccountId {
    AccountId::new(format!("staker-{}", who % 4))
}

// Drive the ledger with arbitrary operations. No sequence may panic, and
// custody must always hold exactly stake plus reward pool.
fuzz_target!(|ops: Vec<Op>| {
    let config = StakingConfig::default();
    let mut token = NullToken::new();
    token.fund(&config.owner, &config.custody, u128::MAX / 8);
    for who in 0..4 {
        token.fund(&account(who), &config.custody, u128::MAX / 8);
    }
    let Ok(mut ledger) = StakingLedger::new(&config, token) else {
        return;
    };
    let owner = config.owner.clone();
    let mut now = Timestamp::new(1_000_000);

    for op in ops {
        let _ = match op {
            Op::Deposit { who, amount } => ledger.deposit(&account(who), amount as u128, now).map(|_| ()),
            Op::TopUp { who, id, amount } => {
                ledger.deposit_to(&account(who), id as u64, amount as u128, now)
            }
            Op::Forced { who, id } => ledger.make_forced_withdrawal(&account(who), id as u64, now).map(|_| ()),
            Op::Request { who, id } => ledger.request_withdrawal(&account(who), id as u64, now),
            Op::Requested { who, id } => ledger
                .make_requested_withdrawal(&account(who), id as u64, now)
                .map(|_| ()),
            Op::Distribute { amount } => ledger.distribute(&owner, amount as u128, now),
            Op::Advance { secs } => {
                now = now.saturating_add(secs as u64);
                Ok(())
            }
        };

        let rewards = ledger.reward_state();
        assert_eq!(
            ledger.token().balance_of(&config.custody),
            rewards.total_staked + rewards.total_remaining_reward
        );
    }
});
