//! The linear release curve for restricted schedules.
//!
//! Everything here is pure: given the window, the schedule totals and a moment, compute how much
//! has been released, how much is claimable and how much can still be revoked.

#![warn(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::clone_on_ref_ptr
)]

use core::cmp;

use num_traits::{CheckedAdd, CheckedSub, Unsigned, Zero};

pub mod traits;

use traits::{FracScale, FracScaleError};

/// An error that can happen when opening a [`ReleaseWindow`].
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// The window would have the same start and end.
    #[error("release duration is zero")]
    ZeroDuration,
    /// The end of the window does not fit the moment type.
    #[error("release window end overflows")]
    Overflow,
}

/// An error that can happen while computing released amounts.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ReleaseError {
    /// Scaling the release basis failed.
    #[error("fraction scaling failed: {0}")]
    Scale(#[from] FracScaleError),
    /// The totals do not add up, for instance more was claimed than was ever deposited.
    #[error("inconsistent schedule totals")]
    InconsistentTotals,
    /// A total does not fit the balance type.
    #[error("balance overflow")]
    Overflow,
}

/// The time window over which a schedule releases linearly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    codec::Encode,
    codec::Decode,
    scale_info::TypeInfo,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(deny_unknown_fields)]
pub struct ReleaseWindow<Moment> {
    /// Nothing is released at or before this moment.
    pub start: Moment,
    /// Everything is released at or after this moment.
    pub end: Moment,
}

/// Where a given moment falls relative to a [`ReleaseWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<Moment> {
    /// The window has not started yet.
    NotStarted,
    /// Part of the window has elapsed.
    Partial {
        /// Time elapsed since the start.
        elapsed: Moment,
        /// The full window length.
        total: Moment,
    },
    /// The window is over.
    Complete,
}

impl<Moment> ReleaseWindow<Moment>
where
    Moment: PartialOrd + Unsigned + CheckedAdd + CheckedSub + Copy,
{
    /// Open a window of `duration` starting at `start`.
    pub fn open(start: Moment, duration: Moment) -> Result<Self, WindowError> {
        if duration.is_zero() {
            return Err(WindowError::ZeroDuration);
        }
        let end = start
            .checked_add(&duration)
            .ok_or(WindowError::Overflow)?;
        Ok(Self { start, end })
    }

    /// Whether the window is non-empty.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Locate `now` in the window.
    pub fn progress(&self, now: Moment) -> Progress<Moment> {
        if now <= self.start {
            return Progress::NotStarted;
        }
        if now >= self.end {
            return Progress::Complete;
        }
        match (now.checked_sub(&self.start), self.end.checked_sub(&self.start)) {
            (Some(elapsed), Some(total)) => Progress::Partial { elapsed, total },
            // Not reachable with start < now < end; release nothing rather than everything.
            _ => Progress::NotStarted,
        }
    }

    /// Release `basis` linearly over the window and return the part released at `now`.
    ///
    /// The whole basis is scaled by the elapsed fraction, so value added to the basis late is
    /// released as if it had been there since the start.
    pub fn linear_released<S, Balance>(
        &self,
        basis: Balance,
        now: Moment,
    ) -> Result<Balance, FracScaleError>
    where
        S: FracScale<Value = Balance, FracPart = Moment>,
        Balance: Zero,
    {
        match self.progress(now) {
            Progress::NotStarted => Ok(Zero::zero()),
            Progress::Complete => Ok(basis),
            Progress::Partial { elapsed, total } => S::frac_scale(&basis, &elapsed, &total),
        }
    }
}

/// The schedule-level totals the release is computed from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    codec::Encode,
    codec::Decode,
    scale_info::TypeInfo,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(deny_unknown_fields)]
pub struct ReleaseState<Balance> {
    /// All-time sum of deposits.
    pub cumulative_deposited: Balance,
    /// All-time sum of claims.
    pub total_claimed: Balance,
    /// All-time sum of revocations.
    pub total_revoked: Balance,
    /// The released amount locked in at the latest revocation.
    pub release_floor: Balance,
}

impl<Balance> ReleaseState<Balance>
where
    Balance: Unsigned + CheckedAdd + CheckedSub + Ord + Copy,
{
    /// A state with nothing deposited.
    pub fn empty() -> Self {
        Self {
            cumulative_deposited: Zero::zero(),
            total_claimed: Zero::zero(),
            total_revoked: Zero::zero(),
            release_floor: Zero::zero(),
        }
    }

    /// The amount the linear curve is applied to: everything deposited minus everything revoked.
    pub fn release_basis(&self) -> Result<Balance, ReleaseError> {
        self.cumulative_deposited
            .checked_sub(&self.total_revoked)
            .ok_or(ReleaseError::InconsistentTotals)
    }

    /// The amount still held by the holders.
    pub fn total_outstanding(&self) -> Result<Balance, ReleaseError> {
        self.release_basis()?
            .checked_sub(&self.total_claimed)
            .ok_or(ReleaseError::InconsistentTotals)
    }

    /// The cumulative released amount at `now`, claimed or not.
    pub fn released<S, Moment>(
        &self,
        window: &ReleaseWindow<Moment>,
        now: Moment,
    ) -> Result<Balance, ReleaseError>
    where
        S: FracScale<Value = Balance, FracPart = Moment>,
        Moment: PartialOrd + Unsigned + CheckedAdd + CheckedSub + Copy,
    {
        let basis = self.release_basis()?;
        let linear = window.linear_released::<S, Balance>(basis, now)?;
        Ok(cmp::min(cmp::max(linear, self.release_floor), basis))
    }

    /// The released amount that has not been claimed yet, bounded by what is outstanding.
    pub fn claimable<S, Moment>(
        &self,
        window: &ReleaseWindow<Moment>,
        now: Moment,
    ) -> Result<Balance, ReleaseError>
    where
        S: FracScale<Value = Balance, FracPart = Moment>,
        Moment: PartialOrd + Unsigned + CheckedAdd + CheckedSub + Copy,
    {
        let released = self.released::<S, Moment>(window, now)?;
        let outstanding = self.total_outstanding()?;
        let unclaimed = released
            .checked_sub(&self.total_claimed)
            .unwrap_or_else(Zero::zero);
        Ok(cmp::min(unclaimed, outstanding))
    }

    /// The outstanding amount that has not been released yet.
    pub fn revocable<S, Moment>(
        &self,
        window: &ReleaseWindow<Moment>,
        now: Moment,
    ) -> Result<Balance, ReleaseError>
    where
        S: FracScale<Value = Balance, FracPart = Moment>,
        Moment: PartialOrd + Unsigned + CheckedAdd + CheckedSub + Copy,
    {
        let claimable = self.claimable::<S, Moment>(window, now)?;
        self.total_outstanding()?
            .checked_sub(&claimable)
            .ok_or(ReleaseError::InconsistentTotals)
    }

    /// Record a deposit.
    pub fn with_deposit(&self, amount: Balance) -> Result<Self, ReleaseError> {
        let cumulative_deposited = self
            .cumulative_deposited
            .checked_add(&amount)
            .ok_or(ReleaseError::Overflow)?;
        Ok(Self {
            cumulative_deposited,
            ..*self
        })
    }

    /// Record a claim.
    pub fn with_claim(&self, amount: Balance) -> Result<Self, ReleaseError> {
        let total_claimed = self
            .total_claimed
            .checked_add(&amount)
            .ok_or(ReleaseError::Overflow)?;
        Ok(Self {
            total_claimed,
            ..*self
        })
    }

    /// Record a revocation that happened when `released` was already released.
    ///
    /// The floor is raised to `released` before the basis shrinks, so whatever was released up to
    /// this point stays released.
    pub fn with_revocation(&self, amount: Balance, released: Balance) -> Result<Self, ReleaseError> {
        let total_revoked = self
            .total_revoked
            .checked_add(&amount)
            .ok_or(ReleaseError::Overflow)?;
        Ok(Self {
            total_revoked,
            release_floor: cmp::max(self.release_floor, released),
            ..*self
        })
    }
}
