//! The staking ledger: deposits, distributions, withdrawals.
//!
//! Every state-changing method follows the same shape: validate, compute
//! the new values with checked arithmetic, take a checkpoint, apply the
//! effects, then call the token collaborator. A failed transfer restores the
//! checkpoint, so callers never observe a half-applied operation. Events are
//! staged in a local buffer and committed only once the call has succeeded.

use crate::config::StakingConfig;
use crate::deposit::{AccountDeposits, Deposit, DepositId};
use crate::error::StakingError;
use crate::event::StakingEvent;
use crate::state::RewardState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_params::StakingParams;
use tally_types::{AccountId, EventLog, Ratio, StakeView, Timestamp, TokenLedger};
use tracing::{debug, error, info, warn};

/// Everything the ledger persists. Serializable for snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub owner: AccountId,
    pub custody: AccountId,
    pub reward_maturity_duration: u64,
    pub params: StakingParams,
    pub rewards: RewardState,
    pub accounts: BTreeMap<AccountId, AccountDeposits>,
}

/// Pre-operation copy of the parts a single call can touch.
struct Checkpoint {
    account: AccountId,
    record: Option<AccountDeposits>,
    rewards: RewardState,
}

/// Staking ledger over an injected token collaborator.
pub struct StakingLedger<T: TokenLedger> {
    state: LedgerState,
    token: T,
    events: EventLog<StakingEvent>,
}

impl<T: TokenLedger> StakingLedger<T> {
    /// Build a ledger from a validated configuration.
    pub fn new(config: &StakingConfig, token: T) -> Result<Self, StakingError> {
        config.validate()?;
        let state = LedgerState {
            owner: config.owner.clone(),
            custody: config.custody.clone(),
            reward_maturity_duration: config.reward_maturity_duration,
            params: config.params()?,
            rewards: RewardState::default(),
            accounts: BTreeMap::new(),
        };
        info!(
            owner = %state.owner,
            custody = %state.custody,
            maturity = state.reward_maturity_duration,
            "staking ledger initialized"
        );
        Ok(Self {
            state,
            token,
            events: EventLog::new(),
        })
    }

    // ── Deposits ───────────────────────────────────────────────────────

    /// Open a new deposit slot with `amount` pulled from `caller`.
    pub fn deposit(
        &mut self,
        caller: &AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<DepositId, StakingError> {
        if amount == 0 {
            return Err(StakingError::InvalidParameter(
                "deposit amount must be positive".into(),
            ));
        }
        let reward_factor = self.state.rewards.reward_factor;
        let total_staked = self
            .state
            .rewards
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;

        let checkpoint = self.checkpoint(caller);
        let id = self
            .state
            .accounts
            .entry(caller.clone())
            .or_default()
            .push(Deposit::new(amount, now, reward_factor));
        self.state.rewards.total_staked = total_staked;

        if let Err(e) = self.pull(caller, amount) {
            self.rollback(checkpoint);
            return Err(e);
        }

        self.events.commit(vec![StakingEvent::Deposited {
            sender: caller.clone(),
            id,
            amount,
            user_balance: amount,
            reward: 0,
            prev_deposit_duration: 0,
            reward_factor,
            total_staked,
        }]);
        debug!(account = %caller, id, amount, total_staked, "deposit opened");
        Ok(id)
    }

    /// Top up an existing slot, settling its accrued reward first.
    ///
    /// The reward is paid only past the maturity cliff; otherwise it is
    /// forfeited and stays in the pool. Either way the slot restarts its
    /// maturity period at `now`.
    pub fn deposit_to(
        &mut self,
        caller: &AccountId,
        id: DepositId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        if amount == 0 {
            return Err(StakingError::InvalidParameter(
                "deposit amount must be positive".into(),
            ));
        }
        let slot = self.slot(caller, id)?.clone();
        let reward_factor = self.state.rewards.reward_factor;

        let accrued = slot
            .accrued_reward(reward_factor)
            .ok_or(StakingError::Overflow)?;
        let reward = if slot.is_mature(now, self.state.reward_maturity_duration) {
            accrued
        } else {
            0
        };
        let prev_deposit_duration = if slot.is_empty() {
            0
        } else {
            slot.deposit_date.elapsed_since(now)
        };
        let user_balance = slot
            .amount
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let total_staked = self
            .state
            .rewards
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::Overflow)?;
        let total_remaining_reward = self
            .state
            .rewards
            .total_remaining_reward
            .checked_sub(reward)
            .ok_or(StakingError::Overflow)?;

        let checkpoint = self.checkpoint(caller);
        if let Some(slot) = self.slot_mut(caller, id) {
            *slot = Deposit::new(user_balance, now, reward_factor);
        }
        self.state.rewards.total_staked = total_staked;
        self.state.rewards.total_remaining_reward = total_remaining_reward;

        if let Err(e) = self.pull(caller, amount) {
            self.rollback(checkpoint);
            return Err(e);
        }
        if let Err(e) = self.pay(caller, reward) {
            self.rollback(checkpoint);
            return Err(self.refund(caller, amount, e));
        }

        if accrued > reward {
            debug!(account = %caller, id, forfeited = accrued - reward, "immature reward forfeited");
        }
        self.events.commit(vec![StakingEvent::Deposited {
            sender: caller.clone(),
            id,
            amount,
            user_balance,
            reward,
            prev_deposit_duration,
            reward_factor,
            total_staked,
        }]);
        debug!(account = %caller, id, amount, reward, user_balance, "deposit topped up");
        Ok(())
    }

    // ── Rewards ────────────────────────────────────────────────────────

    /// Pull `reward` from the owner and split it between stakers and owner.
    pub fn distribute(
        &mut self,
        caller: &AccountId,
        reward: u128,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        self.only_owner(caller)?;
        if reward == 0 {
            return Err(StakingError::InvalidParameter(
                "reward amount must be positive".into(),
            ));
        }
        let share = self.state.params.reward_share_percent(now);

        let before = self.state.rewards.clone();
        let distribution = self.state.rewards.apply_distribution(reward, share)?;
        if let Err(e) = self.pull(caller, reward) {
            self.state.rewards = before;
            return Err(e);
        }

        let rewards = &self.state.rewards;
        let mut staged = Vec::with_capacity(2);
        if distribution.factor_increment.is_some() {
            staged.push(StakingEvent::RewardFactorUpdated {
                reward_factor: rewards.reward_factor,
                total_staked: rewards.total_staked,
            });
        }
        staged.push(StakingEvent::RewardUpdated {
            stakers_reward: distribution.stakers_share,
            owner_reward: distribution.owner_share,
            total_remaining_reward: rewards.total_remaining_reward,
            total_stakers_reward: rewards.total_stakers_reward,
            total_owner_reward: rewards.total_owner_reward,
        });
        if distribution.factor_increment.is_none() {
            warn!(stakers_share = distribution.stakers_share, "nothing staked, reward factor unchanged");
        }
        info!(
            reward,
            stakers = distribution.stakers_share,
            owner = distribution.owner_share,
            reward_factor = rewards.reward_factor,
            "reward distributed"
        );
        self.events.commit(staged);
        Ok(())
    }

    // ── Withdrawals ────────────────────────────────────────────────────

    /// Withdraw a whole slot immediately, paying the current fee on principal.
    ///
    /// Returns the amount transferred to `caller`.
    pub fn make_forced_withdrawal(
        &mut self,
        caller: &AccountId,
        id: DepositId,
        now: Timestamp,
    ) -> Result<u128, StakingError> {
        let fee = self.state.params.fee(now);
        self.withdraw(caller, id, now, fee)
    }

    /// Start the fee-free withdrawal flow for a slot.
    pub fn request_withdrawal(
        &mut self,
        caller: &AccountId,
        id: DepositId,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        if self.slot(caller, id)?.is_empty() {
            return Err(StakingError::InsufficientFunds(id));
        }
        if self.is_request_pending(caller, id, now) {
            return Err(StakingError::WithdrawalAlreadyRequested(id));
        }
        if let Some(record) = self.state.accounts.get_mut(caller) {
            record.set_withdrawal_request(id, now);
        }
        self.events.commit(vec![StakingEvent::WithdrawalRequested {
            sender: caller.clone(),
            id,
        }]);
        debug!(account = %caller, id, "withdrawal requested");
        Ok(())
    }

    /// Complete a requested withdrawal inside its unlock window, without fee.
    ///
    /// Returns the amount transferred to `caller`.
    pub fn make_requested_withdrawal(
        &mut self,
        caller: &AccountId,
        id: DepositId,
        now: Timestamp,
    ) -> Result<u128, StakingError> {
        self.slot(caller, id)?;
        let requested_at = self
            .withdrawal_request(caller, id)
            .ok_or(StakingError::WithdrawalNotRequested(id))?;

        let elapsed = requested_at.elapsed_since(now);
        let lock = self.state.params.withdrawal_lock_duration(now);
        let window_end = lock.saturating_add(self.state.params.withdrawal_unlock_duration(now));
        if elapsed < lock {
            return Err(StakingError::TooEarly {
                remaining: lock - elapsed,
            });
        }
        if elapsed > window_end {
            return Err(StakingError::TooLate {
                overdue: elapsed - window_end,
            });
        }
        self.withdraw(caller, id, now, Ratio::ZERO)
    }

    fn withdraw(
        &mut self,
        caller: &AccountId,
        id: DepositId,
        now: Timestamp,
        fee_rate: Ratio,
    ) -> Result<u128, StakingError> {
        let slot = self.slot(caller, id)?.clone();
        if slot.is_empty() {
            return Err(StakingError::InsufficientFunds(id));
        }

        let accrued = slot
            .accrued_reward(self.state.rewards.reward_factor)
            .ok_or(StakingError::Overflow)?;
        let reward = if slot.is_mature(now, self.state.reward_maturity_duration) {
            accrued
        } else {
            0
        };
        let fee = fee_rate.apply(slot.amount).ok_or(StakingError::Overflow)?;
        let withdrawal_sum = slot
            .amount
            .checked_sub(fee)
            .and_then(|principal| principal.checked_add(reward))
            .ok_or(StakingError::Overflow)?;
        let total_staked = self
            .state
            .rewards
            .total_staked
            .checked_sub(slot.amount)
            .ok_or(StakingError::Overflow)?;
        let total_remaining_reward = self
            .state
            .rewards
            .total_remaining_reward
            .checked_sub(reward)
            .and_then(|r| r.checked_add(fee))
            .ok_or(StakingError::Overflow)?;
        let last_deposit_duration = slot.deposit_date.elapsed_since(now);

        let checkpoint = self.checkpoint(caller);
        if let Some(record) = self.state.accounts.get_mut(caller) {
            if let Some(s) = record.get_mut(id) {
                *s = Deposit::default();
            }
            record.clear_withdrawal_request(id);
        }
        self.state.rewards.total_staked = total_staked;
        self.state.rewards.total_remaining_reward = total_remaining_reward;

        if let Err(e) = self.pay(caller, withdrawal_sum) {
            self.rollback(checkpoint);
            return Err(e);
        }

        self.events.commit(vec![
            StakingEvent::BeforeDepositAndRewardWithdrawn {
                sender: caller.clone(),
                id,
                deposit: slot.amount,
                reward,
            },
            StakingEvent::Withdrawn {
                sender: caller.clone(),
                id,
                withdrawal_sum,
                fee,
                balance: 0,
                reward,
                last_deposit_duration,
                total_staked,
                total_remaining_reward,
            },
        ]);
        debug!(account = %caller, id, withdrawal_sum, fee, reward, "deposit withdrawn");
        Ok(withdrawal_sum)
    }

    // ── Parameters ─────────────────────────────────────────────────────

    /// Schedule a new forced-withdrawal fee. Returns when it takes effect.
    pub fn set_fee(
        &mut self,
        caller: &AccountId,
        value: Ratio,
        now: Timestamp,
    ) -> Result<Timestamp, StakingError> {
        self.only_owner(caller)?;
        let effective_at = self.state.params.set_fee(value, now)?;
        self.events.commit(vec![StakingEvent::FeeSet {
            value,
            sender: caller.clone(),
        }]);
        info!(%value, %effective_at, "fee scheduled");
        Ok(effective_at)
    }

    pub fn set_withdrawal_lock_duration(
        &mut self,
        caller: &AccountId,
        value: u64,
        now: Timestamp,
    ) -> Result<Timestamp, StakingError> {
        self.only_owner(caller)?;
        let effective_at = self.state.params.set_withdrawal_lock_duration(value, now)?;
        self.events
            .commit(vec![StakingEvent::WithdrawalLockDurationSet {
                value,
                sender: caller.clone(),
            }]);
        info!(value, %effective_at, "withdrawal lock duration scheduled");
        Ok(effective_at)
    }

    pub fn set_withdrawal_unlock_duration(
        &mut self,
        caller: &AccountId,
        value: u64,
        now: Timestamp,
    ) -> Result<Timestamp, StakingError> {
        self.only_owner(caller)?;
        let effective_at = self
            .state
            .params
            .set_withdrawal_unlock_duration(value, now)?;
        self.events
            .commit(vec![StakingEvent::WithdrawalUnlockDurationSet {
                value,
                sender: caller.clone(),
            }]);
        info!(value, %effective_at, "withdrawal unlock duration scheduled");
        Ok(effective_at)
    }

    pub fn set_reward_share_percent(
        &mut self,
        caller: &AccountId,
        value: Ratio,
        now: Timestamp,
    ) -> Result<Timestamp, StakingError> {
        self.only_owner(caller)?;
        let effective_at = self.state.params.set_reward_share_percent(value, now)?;
        self.events.commit(vec![StakingEvent::RewardSharePercentSet {
            value,
            sender: caller.clone(),
        }]);
        info!(%value, %effective_at, "reward share scheduled");
        Ok(effective_at)
    }

    // ── Views ──────────────────────────────────────────────────────────

    pub fn owner(&self) -> &AccountId {
        &self.state.owner
    }

    pub fn custody(&self) -> &AccountId {
        &self.state.custody
    }

    pub fn reward_state(&self) -> &RewardState {
        &self.state.rewards
    }

    pub fn params(&self) -> &StakingParams {
        &self.state.params
    }

    pub fn reward_maturity_duration(&self) -> u64 {
        self.state.reward_maturity_duration
    }

    pub fn fee(&self, now: Timestamp) -> Ratio {
        self.state.params.fee(now)
    }

    pub fn withdrawal_lock_duration(&self, now: Timestamp) -> u64 {
        self.state.params.withdrawal_lock_duration(now)
    }

    pub fn withdrawal_unlock_duration(&self, now: Timestamp) -> u64 {
        self.state.params.withdrawal_unlock_duration(now)
    }

    pub fn reward_share_percent(&self, now: Timestamp) -> Ratio {
        self.state.params.reward_share_percent(now)
    }

    /// The slot `id` of `account`, if it was ever assigned.
    pub fn deposit_of(&self, account: &AccountId, id: DepositId) -> Option<&Deposit> {
        self.state.accounts.get(account)?.get(id)
    }

    /// Current amount in a slot; 0 for unknown or emptied slots.
    pub fn balance(&self, account: &AccountId, id: DepositId) -> u128 {
        self.deposit_of(account, id).map_or(0, |d| d.amount)
    }

    pub fn last_deposit_id(&self, account: &AccountId) -> DepositId {
        self.state
            .accounts
            .get(account)
            .map_or(0, AccountDeposits::last_deposit_id)
    }

    /// When a withdrawal of this slot was requested, expired requests included.
    pub fn withdrawal_request(&self, account: &AccountId, id: DepositId) -> Option<Timestamp> {
        self.state.accounts.get(account)?.withdrawal_request(id)
    }

    /// Reward that a withdrawal at `now` would pay out.
    pub fn pending_reward(&self, account: &AccountId, id: DepositId, now: Timestamp) -> u128 {
        match self.deposit_of(account, id) {
            Some(d) if d.is_mature(now, self.state.reward_maturity_duration) => d
                .accrued_reward(self.state.rewards.reward_factor)
                .unwrap_or(0),
            _ => 0,
        }
    }

    /// Sum of every nonzero slot owned by `account`.
    pub fn total_user_balance(&self, account: &AccountId) -> u128 {
        self.state
            .accounts
            .get(account)
            .map_or(0, AccountDeposits::total_balance)
    }

    pub fn events(&self) -> &EventLog<StakingEvent> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventLog<StakingEvent> {
        &mut self.events
    }

    /// Register a listener called for every committed event.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&StakingEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    // ── Persistence ────────────────────────────────────────────────────

    /// Serialize the ledger state. The token and the event log are not included.
    pub fn save_state(&self) -> Result<Vec<u8>, StakingError> {
        bincode::serialize(&self.state).map_err(|e| StakingError::Snapshot(e.to_string()))
    }

    /// Restore a ledger from [`save_state`](Self::save_state) bytes.
    pub fn load_state(data: &[u8], token: T) -> Result<Self, StakingError> {
        let state: LedgerState =
            bincode::deserialize(data).map_err(|e| StakingError::Snapshot(e.to_string()))?;
        debug!(accounts = state.accounts.len(), "staking ledger restored");
        Ok(Self {
            state,
            token,
            events: EventLog::new(),
        })
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn only_owner(&self, caller: &AccountId) -> Result<(), StakingError> {
        if *caller != self.state.owner {
            warn!(caller = %caller, "privileged call rejected");
            return Err(StakingError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    fn slot(&self, caller: &AccountId, id: DepositId) -> Result<&Deposit, StakingError> {
        self.deposit_of(caller, id)
            .ok_or(StakingError::WrongDepositId(id))
    }

    fn slot_mut(&mut self, caller: &AccountId, id: DepositId) -> Option<&mut Deposit> {
        self.state.accounts.get_mut(caller)?.get_mut(id)
    }

    /// A request counts as pending until its unlock window has closed.
    fn is_request_pending(&self, caller: &AccountId, id: DepositId, now: Timestamp) -> bool {
        match self.withdrawal_request(caller, id) {
            Some(at) => {
                let window = self
                    .state
                    .params
                    .withdrawal_lock_duration(now)
                    .saturating_add(self.state.params.withdrawal_unlock_duration(now));
                at.elapsed_since(now) <= window
            }
            None => false,
        }
    }

    fn checkpoint(&self, account: &AccountId) -> Checkpoint {
        Checkpoint {
            account: account.clone(),
            record: self.state.accounts.get(account).cloned(),
            rewards: self.state.rewards.clone(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        match checkpoint.record {
            Some(record) => {
                self.state.accounts.insert(checkpoint.account, record);
            }
            None => {
                self.state.accounts.remove(&checkpoint.account);
            }
        }
        self.state.rewards = checkpoint.rewards;
    }

    /// Move `amount` from `from` into custody.
    fn pull(&mut self, from: &AccountId, amount: u128) -> Result<(), StakingError> {
        let custody = self.state.custody.clone();
        self.token
            .transfer_from(&custody, from, &custody, amount)
            .map_err(|e| {
                warn!(account = %from, amount, error = %e, "inbound transfer failed");
                StakingError::TransferFailed(e)
            })
    }

    /// Move `amount` out of custody to `to`. Zero amounts are skipped.
    fn pay(&mut self, to: &AccountId, amount: u128) -> Result<(), StakingError> {
        if amount == 0 {
            return Ok(());
        }
        let custody = self.state.custody.clone();
        self.token.transfer(&custody, to, amount).map_err(|e| {
            warn!(account = %to, amount, error = %e, "outbound transfer failed");
            StakingError::TransferFailed(e)
        })
    }

    /// Return a pulled amount after a later step of the same call failed
    /// with `cause`. Returns the error to report: `cause` itself, or
    /// `RefundFailed` when the tokens could not be sent back.
    fn refund(&mut self, to: &AccountId, amount: u128, cause: StakingError) -> StakingError {
        let custody = self.state.custody.clone();
        match self.token.transfer(&custody, to, amount) {
            Ok(()) => cause,
            Err(reason) => {
                error!(account = %to, amount, error = %reason, "refund of pulled deposit failed");
                StakingError::RefundFailed {
                    account: to.clone(),
                    amount,
                    cause: Box::new(cause),
                    reason,
                }
            }
        }
    }
}

impl<T: TokenLedger> StakeView for StakingLedger<T> {
    fn total_user_balance(&self, account: &AccountId) -> u128 {
        StakingLedger::total_user_balance(self, account)
    }
}
