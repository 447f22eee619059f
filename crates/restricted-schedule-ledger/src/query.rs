//! Read-only projections of the ledger state.
//!
//! Unknown schedules are not an error here: they project to an empty result with `exists` unset.
//! The batch queries answer every id with its own result, so one schedule failing to project does
//! not hide the others.

use schedule_release_linear::ReleaseError;
use serde::Serialize;

use crate::{
    types::{Balance, DurationKey, Moment},
    Config, Ledger, ScheduleRecordOf,
};

/// The state of a schedule at a given moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary<AccountId, Methodology> {
    /// Whether the schedule exists.
    pub exists: bool,
    /// The duration table key the schedule was created with.
    pub duration_key: Option<DurationKey<Methodology>>,
    /// The start of the release window.
    pub start_time: Moment,
    /// The end of the release window.
    pub end_time: Moment,
    /// All-time sum of deposits.
    pub cumulative_deposited: Balance,
    /// The value still held across all holders.
    pub total_outstanding: Balance,
    /// All-time sum of claims.
    pub total_claimed: Balance,
    /// All-time sum of revocations.
    pub total_revoked: Balance,
    /// The release floor.
    pub release_floor: Balance,
    /// What can be claimed across all holders.
    pub claimable: Balance,
    /// What can be revoked.
    pub revocable: Balance,
    /// The holders and their balances, in holder order.
    pub holders: Vec<(AccountId, Balance)>,
}

impl<AccountId, Methodology> ScheduleSummary<AccountId, Methodology> {
    /// The summary of a schedule that does not exist.
    pub fn not_found() -> Self {
        Self {
            exists: false,
            duration_key: None,
            start_time: 0,
            end_time: 0,
            cumulative_deposited: 0,
            total_outstanding: 0,
            total_claimed: 0,
            total_revoked: 0,
            release_floor: 0,
            claimable: 0,
            revocable: 0,
            holders: Vec::new(),
        }
    }
}

/// The state of a holder within a schedule at a given moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccountDetail {
    /// Whether the schedule exists.
    pub exists: bool,
    /// The outstanding balance.
    pub balance: Balance,
    /// The pro-rata claimable amount.
    pub claimable: Balance,
    /// Everything the holder has claimed.
    pub claimed: Balance,
    /// Everything revoked from the holder.
    pub revoked: Balance,
}

/// Project a record into its summary.
fn summarize<T: Config>(
    record: &ScheduleRecordOf<T>,
    now: Moment,
) -> Result<ScheduleSummary<T::AccountId, T::Methodology>, ReleaseError> {
    let totals = &record.totals;
    Ok(ScheduleSummary {
        exists: true,
        duration_key: Some(record.duration_key.clone()),
        start_time: record.window.start,
        end_time: record.window.end,
        cumulative_deposited: totals.cumulative_deposited,
        total_outstanding: totals.total_outstanding()?,
        total_claimed: totals.total_claimed,
        total_revoked: totals.total_revoked,
        release_floor: totals.release_floor,
        claimable: record.claimable_at(now)?,
        revocable: record.revocable_at(now)?,
        holders: record
            .holders
            .iter()
            .map(|(holder, balance)| (holder.clone(), *balance))
            .collect(),
    })
}

/// Project a record into the holder detail.
fn detail<T: Config>(
    record: &ScheduleRecordOf<T>,
    holder: &T::AccountId,
    now: Moment,
) -> Result<AccountDetail, ReleaseError> {
    let history = record.history_of(holder);
    Ok(AccountDetail {
        exists: true,
        balance: record.balance_of(holder),
        claimable: record.claimable_for_account_at(holder, now)?,
        claimed: history.claimed,
        revoked: history.revoked,
    })
}

impl<T: Config> Ledger<T> {
    /// The summary of a schedule now.
    pub async fn schedule_summary(
        &self,
        schedule_id: &T::ScheduleId,
    ) -> Result<ScheduleSummary<T::AccountId, T::Methodology>, ReleaseError> {
        self.schedule_summary_at(schedule_id, self.now()).await
    }

    /// The summary of a schedule at `now`.
    pub async fn schedule_summary_at(
        &self,
        schedule_id: &T::ScheduleId,
        now: Moment,
    ) -> Result<ScheduleSummary<T::AccountId, T::Methodology>, ReleaseError> {
        let Some(handle) = self.schedule_handle(schedule_id).await else {
            return Ok(ScheduleSummary::not_found());
        };
        let record = handle.lock().await;
        summarize::<T>(&record, now)
    }

    /// The summaries of the schedules now, in the order requested.
    pub async fn schedule_summaries(
        &self,
        schedule_ids: &[T::ScheduleId],
    ) -> Vec<Result<ScheduleSummary<T::AccountId, T::Methodology>, ReleaseError>> {
        self.schedule_summaries_at(schedule_ids, self.now()).await
    }

    /// The summaries of the schedules at `now`, in the order requested.
    pub async fn schedule_summaries_at(
        &self,
        schedule_ids: &[T::ScheduleId],
        now: Moment,
    ) -> Vec<Result<ScheduleSummary<T::AccountId, T::Methodology>, ReleaseError>> {
        let mut summaries = Vec::with_capacity(schedule_ids.len());
        for schedule_id in schedule_ids {
            summaries.push(self.schedule_summary_at(schedule_id, now).await);
        }
        summaries
    }

    /// The detail of a holder in a schedule now.
    pub async fn account_detail(
        &self,
        schedule_id: &T::ScheduleId,
        holder: &T::AccountId,
    ) -> Result<AccountDetail, ReleaseError> {
        self.account_detail_at(schedule_id, holder, self.now()).await
    }

    /// The detail of a holder in a schedule at `now`.
    pub async fn account_detail_at(
        &self,
        schedule_id: &T::ScheduleId,
        holder: &T::AccountId,
        now: Moment,
    ) -> Result<AccountDetail, ReleaseError> {
        let Some(handle) = self.schedule_handle(schedule_id).await else {
            return Ok(AccountDetail::default());
        };
        let record = handle.lock().await;
        detail::<T>(&record, holder, now)
    }

    /// The details of a holder in the schedules now, in the order requested.
    pub async fn account_details(
        &self,
        schedule_ids: &[T::ScheduleId],
        holder: &T::AccountId,
    ) -> Vec<Result<AccountDetail, ReleaseError>> {
        self.account_details_at(schedule_ids, holder, self.now()).await
    }

    /// The details of a holder in the schedules at `now`, in the order requested.
    pub async fn account_details_at(
        &self,
        schedule_ids: &[T::ScheduleId],
        holder: &T::AccountId,
        now: Moment,
    ) -> Vec<Result<AccountDetail, ReleaseError>> {
        let mut details = Vec::with_capacity(schedule_ids.len());
        for schedule_id in schedule_ids {
            details.push(self.account_detail_at(schedule_id, holder, now).await);
        }
        details
    }

    /// A copy of the stored record of a schedule.
    pub async fn schedule_record(&self, schedule_id: &T::ScheduleId) -> Option<ScheduleRecordOf<T>> {
        let handle = self.schedule_handle(schedule_id).await?;
        let record = handle.lock().await;
        Some(record.clone())
    }
}
