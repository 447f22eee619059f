//! Ledger events.

use schedule_release_linear::ReleaseWindow;

use crate::types::{Balance, DurationKey, Moment};

/// An event emitted once a ledger change has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<ScheduleId, AccountId, Methodology> {
    /// A release duration was set.
    DurationSet {
        /// The duration table key.
        key: DurationKey<Methodology>,
        /// The new duration.
        duration: Moment,
        /// The duration that was replaced, if any.
        previous: Option<Moment>,
    },
    /// A schedule was created by its first deposit.
    ScheduleCreated {
        /// The created schedule.
        schedule_id: ScheduleId,
        /// The duration table key the window was derived from.
        key: DurationKey<Methodology>,
        /// The release window.
        window: ReleaseWindow<Moment>,
    },
    /// Value was deposited into a schedule.
    Deposited {
        /// The schedule.
        schedule_id: ScheduleId,
        /// The holder credited.
        holder: AccountId,
        /// The deposited amount.
        amount: Balance,
    },
    /// Released value was claimed.
    Claimed {
        /// The schedule.
        schedule_id: ScheduleId,
        /// The holder debited.
        holder: AccountId,
        /// Who received the value.
        recipient: AccountId,
        /// The claimed amount.
        amount: Balance,
    },
    /// Balance was moved between holders.
    Transferred {
        /// The schedule.
        schedule_id: ScheduleId,
        /// The sender.
        from: AccountId,
        /// The receiver.
        to: AccountId,
        /// The moved amount.
        amount: Balance,
    },
    /// Unreleased value was revoked.
    Revoked {
        /// The schedule.
        schedule_id: ScheduleId,
        /// Who received the revoked value.
        recipient: AccountId,
        /// The revoked amount.
        amount: Balance,
        /// The release floor after the revocation.
        release_floor: Balance,
        /// The amount taken from each holder.
        shares: Vec<(AccountId, Balance)>,
    },
}
