//! Per-account deposit slots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_types::{mul_div, Timestamp, SCALE};

/// 1-based slot number within one account. 0 never names a slot.
pub type DepositId = u64;

/// One deposit slot.
///
/// An emptied slot keeps its id and can be topped up again; its amount is
/// zero and its date is the epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub amount: u128,
    /// Start of the current maturity period. Reset by every top-up.
    pub deposit_date: Timestamp,
    /// Reward factor at the last settlement of this slot.
    pub reward_factor_snapshot: u128,
}

impl Deposit {
    pub fn new(amount: u128, now: Timestamp, reward_factor: u128) -> Self {
        Self {
            amount,
            deposit_date: now,
            reward_factor_snapshot: reward_factor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    /// Reward accrued since the last settlement, `None` on overflow.
    pub fn accrued_reward(&self, reward_factor: u128) -> Option<u128> {
        let delta = reward_factor.checked_sub(self.reward_factor_snapshot)?;
        mul_div(self.amount, delta, SCALE)
    }

    /// Whether the maturity cliff has been reached at `now`.
    pub fn is_mature(&self, now: Timestamp, maturity: u64) -> bool {
        self.deposit_date.has_expired(maturity, now)
    }
}

/// All slots ever assigned to one account, plus its pending withdrawal requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDeposits {
    slots: Vec<Deposit>,
    withdrawal_requests: BTreeMap<DepositId, Timestamp>,
}

impl AccountDeposits {
    /// The highest id assigned so far (0 when the account never deposited).
    pub fn last_deposit_id(&self) -> DepositId {
        self.slots.len() as DepositId
    }

    pub fn get(&self, id: DepositId) -> Option<&Deposit> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, id: DepositId) -> Option<&mut Deposit> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.slots.get_mut(index)
    }

    /// Append a new slot and return its id.
    pub fn push(&mut self, deposit: Deposit) -> DepositId {
        self.slots.push(deposit);
        self.last_deposit_id()
    }

    /// Sum of every slot's current amount.
    pub fn total_balance(&self) -> u128 {
        self.slots
            .iter()
            .fold(0u128, |acc, d| acc.saturating_add(d.amount))
    }

    pub fn withdrawal_request(&self, id: DepositId) -> Option<Timestamp> {
        self.withdrawal_requests.get(&id).copied()
    }

    pub fn set_withdrawal_request(&mut self, id: DepositId, at: Timestamp) {
        self.withdrawal_requests.insert(id, at);
    }

    pub fn clear_withdrawal_request(&mut self, id: DepositId) -> Option<Timestamp> {
        self.withdrawal_requests.remove(&id)
    }
}
