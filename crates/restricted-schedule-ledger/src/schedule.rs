//! Logic of the schedule (re)computation and effects.
//!
//! Everything here operates on a single [`ScheduleRecord`]. The mutating functions are meant to
//! be run against a working copy of the record: the caller commits the copy only once every
//! effect, including the external delivery, has succeeded.

use std::collections::BTreeMap;

use num::Zero;
use schedule_release_linear::{traits::FracScale, ReleaseError, ReleaseState, ReleaseWindow};

use crate::types::{
    Balance, DurationKey, HolderHistory, Moment, ScheduleRecord, ShareScaler, TimeScaler,
};

/// A violated schedule invariant.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The release window does not end after it starts.
    #[error("release window is empty")]
    EmptyWindow,
    /// More was claimed than was ever deposited.
    #[error("claimed total exceeds deposited total")]
    ClaimedExceedsDeposited,
    /// More was revoked than was ever deposited.
    #[error("revoked total exceeds deposited total")]
    RevokedExceedsDeposited,
    /// The totals do not leave a non-negative outstanding amount.
    #[error("claimed and revoked totals exceed deposited total")]
    NegativeOutstanding,
    /// Holder balances do not sum up to the outstanding amount.
    #[error("holder balances sum to {actual}, outstanding is {expected}")]
    OutstandingMismatch {
        /// The outstanding amount derived from the totals.
        expected: Balance,
        /// The sum of the holder balances.
        actual: Balance,
    },
    /// A holder entry with a zero balance is present.
    #[error("zero-balance holder present")]
    ZeroBalanceHolder,
    /// The release floor is above the release basis.
    #[error("release floor exceeds release basis")]
    FloorAboveBasis,
}

impl<AccountId, Methodology> ScheduleRecord<AccountId, Methodology>
where
    AccountId: Ord + Clone,
{
    /// A fresh record with nothing deposited.
    pub fn new(duration_key: DurationKey<Methodology>, window: ReleaseWindow<Moment>) -> Self {
        Self {
            duration_key,
            window,
            totals: ReleaseState::empty(),
            holders: BTreeMap::new(),
            history: BTreeMap::new(),
        }
    }

    /// The outstanding balance of a holder.
    pub fn balance_of(&self, holder: &AccountId) -> Balance {
        self.holders.get(holder).copied().unwrap_or_default()
    }

    /// The reporting history of a holder.
    pub fn history_of(&self, holder: &AccountId) -> HolderHistory {
        self.history.get(holder).copied().unwrap_or_default()
    }

    /// The value still held across all holders.
    pub fn total_outstanding(&self) -> Result<Balance, ReleaseError> {
        self.totals.total_outstanding()
    }

    /// The cumulative released amount at `now`.
    pub fn released_at(&self, now: Moment) -> Result<Balance, ReleaseError> {
        self.totals.released::<TimeScaler, Moment>(&self.window, now)
    }

    /// The schedule-level claimable amount at `now`.
    pub fn claimable_at(&self, now: Moment) -> Result<Balance, ReleaseError> {
        self.totals.claimable::<TimeScaler, Moment>(&self.window, now)
    }

    /// The schedule-level revocable amount at `now`.
    pub fn revocable_at(&self, now: Moment) -> Result<Balance, ReleaseError> {
        self.totals.revocable::<TimeScaler, Moment>(&self.window, now)
    }

    /// The holder's pro-rata share of the schedule-level claimable amount at `now`.
    pub fn claimable_for_account_at(
        &self,
        holder: &AccountId,
        now: Moment,
    ) -> Result<Balance, ReleaseError> {
        let balance = self.balance_of(holder);
        if balance.is_zero() {
            return Ok(Zero::zero());
        }
        let claimable = self.claimable_at(now)?;
        let outstanding = self.total_outstanding()?;
        Ok(ShareScaler::frac_scale(&claimable, &balance, &outstanding)?)
    }

    /// Credit a deposit to the holder.
    ///
    /// A zero deposit changes nothing.
    pub(crate) fn deposit(&mut self, holder: &AccountId, amount: Balance) -> Result<(), ReleaseError> {
        if amount.is_zero() {
            return Ok(());
        }
        self.totals = self.totals.with_deposit(amount)?;
        credit(&mut self.holders, holder, amount)
    }

    /// Take a claim out of the holder's balance.
    ///
    /// The amount must have been checked against the holder's claimable amount.
    pub(crate) fn claim(&mut self, holder: &AccountId, amount: Balance) -> Result<(), ReleaseError> {
        debit(&mut self.holders, holder, amount)?;
        self.totals = self.totals.with_claim(amount)?;

        let history = self.history.entry(holder.clone()).or_default();
        history.claimed = history
            .claimed
            .checked_add(amount)
            .ok_or(ReleaseError::Overflow)?;
        Ok(())
    }

    /// Move balance between holders.
    ///
    /// The amount must have been checked against the sender's balance.
    pub(crate) fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Balance,
    ) -> Result<(), ReleaseError> {
        debit(&mut self.holders, from, amount)?;
        credit(&mut self.holders, to, amount)
    }

    /// Revoke `amount` of unreleased value, given that `released` is released at this moment.
    ///
    /// Returns the per-holder shares. The amount must have been checked against the revocable
    /// amount.
    pub(crate) fn revoke(
        &mut self,
        amount: Balance,
        released: Balance,
    ) -> Result<Vec<(AccountId, Balance)>, ReleaseError> {
        let shares = self.revocation_shares(amount)?;
        for (holder, share) in &shares {
            debit(&mut self.holders, holder, *share)?;

            let history = self.history.entry(holder.clone()).or_default();
            history.revoked = history
                .revoked
                .checked_add(*share)
                .ok_or(ReleaseError::Overflow)?;
        }
        self.totals = self.totals.with_revocation(amount, released)?;
        Ok(shares)
    }

    /// Split `amount` across the holders pro rata to their balances.
    ///
    /// Every share is floored. The units lost to flooring go to the last holder in key order; if
    /// its balance cannot take all of them the rest moves on to the preceding holders. The
    /// shares always sum up to `amount` exactly and never exceed a holder's balance.
    pub fn revocation_shares(
        &self,
        amount: Balance,
    ) -> Result<Vec<(AccountId, Balance)>, ReleaseError> {
        let outstanding = self.total_outstanding()?;
        if amount > outstanding {
            return Err(ReleaseError::InconsistentTotals);
        }
        if amount.is_zero() {
            return Ok(Vec::new());
        }

        let mut shares = Vec::with_capacity(self.holders.len());
        let mut assigned: Balance = Zero::zero();
        for (holder, balance) in &self.holders {
            let share = ShareScaler::frac_scale(&amount, balance, &outstanding)?;
            assigned = assigned.checked_add(share).ok_or(ReleaseError::Overflow)?;
            shares.push((holder.clone(), *balance, share));
        }

        let mut remainder = amount
            .checked_sub(assigned)
            .ok_or(ReleaseError::InconsistentTotals)?;
        for (_, balance, share) in shares.iter_mut().rev() {
            if remainder.is_zero() {
                break;
            }
            let extra = remainder.min(balance.saturating_sub(*share));
            *share = share.saturating_add(extra);
            remainder = remainder.saturating_sub(extra);
        }
        if !remainder.is_zero() {
            return Err(ReleaseError::InconsistentTotals);
        }

        Ok(shares
            .into_iter()
            .filter(|(_, _, share)| !share.is_zero())
            .map(|(holder, _, share)| (holder, share))
            .collect())
    }

    /// Check the record against the schedule invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if !self.window.is_valid() {
            return Err(InvariantViolation::EmptyWindow);
        }

        let totals = &self.totals;
        if totals.total_claimed > totals.cumulative_deposited {
            return Err(InvariantViolation::ClaimedExceedsDeposited);
        }
        if totals.total_revoked > totals.cumulative_deposited {
            return Err(InvariantViolation::RevokedExceedsDeposited);
        }
        let expected = totals
            .total_outstanding()
            .map_err(|_| InvariantViolation::NegativeOutstanding)?;

        if self.holders.values().any(Zero::is_zero) {
            return Err(InvariantViolation::ZeroBalanceHolder);
        }
        let actual = self
            .holders
            .values()
            .try_fold(Balance::zero(), |acc, balance| acc.checked_add(*balance));
        if actual != Some(expected) {
            return Err(InvariantViolation::OutstandingMismatch {
                expected,
                actual: actual.unwrap_or(Balance::MAX),
            });
        }

        let basis = totals
            .release_basis()
            .map_err(|_| InvariantViolation::RevokedExceedsDeposited)?;
        if totals.release_floor > basis {
            return Err(InvariantViolation::FloorAboveBasis);
        }

        Ok(())
    }
}

/// Add to a holder's balance, inserting the holder if needed.
fn credit<AccountId: Ord + Clone>(
    holders: &mut BTreeMap<AccountId, Balance>,
    holder: &AccountId,
    amount: Balance,
) -> Result<(), ReleaseError> {
    if amount.is_zero() {
        return Ok(());
    }
    let current = holders.get(holder).copied().unwrap_or_default();
    let updated = current
        .checked_add(amount)
        .ok_or(ReleaseError::Overflow)?;
    holders.insert(holder.clone(), updated);
    Ok(())
}

/// Subtract from a holder's balance, removing the holder once it reaches zero.
fn debit<AccountId: Ord + Clone>(
    holders: &mut BTreeMap<AccountId, Balance>,
    holder: &AccountId,
    amount: Balance,
) -> Result<(), ReleaseError> {
    let current = holders.get(holder).copied().unwrap_or_default();
    let updated = current
        .checked_sub(amount)
        .ok_or(ReleaseError::InconsistentTotals)?;
    if updated.is_zero() {
        holders.remove(holder);
    } else {
        holders.insert(holder.clone(), updated);
    }
    Ok(())
}
