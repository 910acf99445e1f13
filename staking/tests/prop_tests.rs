use proptest::prelude::*;

use tally_nullables::NullToken;
use tally_staking::{StakingConfig, StakingLedger};
use tally_types::{AccountId, Ratio, Timestamp, TokenLedger, DAY, SCALE};

const ACCOUNTS: [&str; 3] = ["alice", "bob", "carol"];

#[derive(Clone, Debug)]
enum Op {
    Deposit(usize, u128),
    TopUp(usize, u64, u128),
    Withdraw(usize, u64),
    Distribute(u128),
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 1u128..1_000_000).prop_map(|(a, x)| Op::Deposit(a, x * SCALE)),
        (0..3usize, 1u64..4, 1u128..1_000_000).prop_map(|(a, id, x)| Op::TopUp(a, id, x * SCALE)),
        (0..3usize, 1u64..4).prop_map(|(a, id)| Op::Withdraw(a, id)),
        (1u128..1_000_000).prop_map(|x| Op::Distribute(x * SCALE)),
        (0u64..30 * DAY).prop_map(Op::Advance),
    ]
}

fn funded_ledger(config: &StakingConfig) -> StakingLedger<NullToken> {
    let mut token = NullToken::new();
    token.fund(&config.owner, &config.custody, u128::MAX / 4);
    for name in ACCOUNTS {
        token.fund(&AccountId::new(name), &config.custody, u128::MAX / 4);
    }
    StakingLedger::new(config, token).unwrap()
}

proptest! {
    /// Total stake always equals the sum of live slots, the factor never
    /// shrinks, and custody holds exactly stake plus reward pool.
    #[test]
    fn ledger_invariants_hold(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let config = StakingConfig::default();
        let mut ledger = funded_ledger(&config);
        let owner = config.owner.clone();
        let mut now = Timestamp::new(1_000_000);
        let mut last_factor = 0;

        for op in ops {
            match op {
                Op::Deposit(a, amount) => {
                    let _ = ledger.deposit(&AccountId::new(ACCOUNTS[a]), amount, now);
                }
                Op::TopUp(a, id, amount) => {
                    let _ = ledger.deposit_to(&AccountId::new(ACCOUNTS[a]), id, amount, now);
                }
                Op::Withdraw(a, id) => {
                    let _ = ledger.make_forced_withdrawal(&AccountId::new(ACCOUNTS[a]), id, now);
                }
                Op::Distribute(amount) => {
                    let _ = ledger.distribute(&owner, amount, now);
                }
                Op::Advance(secs) => now = now.saturating_add(secs),
            }

            let rewards = ledger.reward_state();
            let staked: u128 = ACCOUNTS
                .iter()
                .map(|a| ledger.total_user_balance(&AccountId::new(*a)))
                .sum();
            prop_assert_eq!(rewards.total_staked, staked);
            prop_assert!(rewards.reward_factor >= last_factor);
            last_factor = rewards.reward_factor;
            prop_assert_eq!(
                ledger.token().balance_of(&config.custody),
                rewards.total_staked + rewards.total_remaining_reward
            );
        }
    }

    /// One distribution moves the factor by exactly floor(r * share / T).
    #[test]
    fn factor_increment_is_exact(
        staked in 1u128..1_000_000_000_000_000_000_000,
        reward in 1u128..1_000_000_000_000_000_000_000,
        share_pct in 0u64..=100,
    ) {
        let config = StakingConfig {
            reward_share_percent: Ratio::from_percent(share_pct),
            ..Default::default()
        };
        let mut ledger = funded_ledger(&config);
        let now = Timestamp::new(1_000);
        ledger.deposit(&AccountId::new("alice"), staked, now).unwrap();
        ledger.distribute(&config.owner, reward, now).unwrap();

        let stakers_share = reward * share_pct as u128 / 100;
        let expected = tally_types::mul_div(stakers_share, SCALE, staked).unwrap();
        prop_assert_eq!(ledger.reward_state().reward_factor, expected);
    }

    /// Deposit then withdraw at the same instant returns principal minus fee.
    #[test]
    fn instant_roundtrip_costs_only_the_fee(
        amount in 1u128..1_000_000_000_000_000_000_000_000,
        fee_pct in 0u64..=100,
    ) {
        let config = StakingConfig {
            fee: Ratio::from_percent(fee_pct),
            ..Default::default()
        };
        let mut ledger = funded_ledger(&config);
        let alice = AccountId::new("alice");
        let now = Timestamp::new(1_000);
        let id = ledger.deposit(&alice, amount, now).unwrap();
        let sum = ledger.make_forced_withdrawal(&alice, id, now).unwrap();
        let fee = Ratio::from_percent(fee_pct).apply(amount).unwrap();
        prop_assert_eq!(sum, amount - fee);
    }
}
