//! Transfer operations.
//!
//! Transfers only move outstanding balance between holders; the schedule totals stay as they
//! are, so claim rights follow the balances right away.

use std::{collections::BTreeMap, sync::Arc};

use schedule_release_linear::ReleaseError;
use tracing::debug;

use super::LogicOp;
use crate::{types::Balance, Config, Event, Ledger, ScheduleRecordOf};

/// The request of the transfer operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<ScheduleId, AccountId> {
    /// The schedule to transfer within.
    pub schedule_id: ScheduleId,
    /// The sender.
    pub from: AccountId,
    /// The receiver.
    pub to: AccountId,
    /// The amount to move.
    pub amount: Balance,
}

/// The response of the transfer operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The sender balance after the transfer.
    pub from_balance: Balance,
    /// The receiver balance after the transfer.
    pub to_balance: Balance,
}

/// The request of the batch transfer operation.
///
/// Either every item is applied or none is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest<ScheduleId, AccountId> {
    /// The sender.
    pub from: AccountId,
    /// The receiver.
    pub to: AccountId,
    /// The schedules and the amounts to move in each.
    /// Repeated schedules are applied cumulatively.
    pub items: Vec<(ScheduleId, Balance)>,
}

/// The response of the batch transfer operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResponse<ScheduleId> {
    /// The total moved per schedule, in schedule order.
    pub transferred: Vec<(ScheduleId, Balance)>,
}

/// Errors for the transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum Error<ScheduleId, AccountId> {
    /// The schedule does not exist.
    #[error("schedule {0:?} not found")]
    ScheduleNotFound(ScheduleId),
    /// The sender does not hold enough in the schedule.
    #[error("insufficient balance of {holder:?} in schedule {schedule_id:?}: {balance} held, {requested} requested")]
    InsufficientBalance {
        /// The sender.
        holder: AccountId,
        /// The schedule.
        schedule_id: ScheduleId,
        /// What the sender holds.
        balance: Balance,
        /// What was requested.
        requested: Balance,
    },
    /// The transfer does not fit the balances.
    #[error("arithmetic: {0}")]
    Arithmetic(#[from] ReleaseError),
}

/// Check the sender balance and apply the transfer to a copy of the record.
fn apply<T: Config>(
    record: &ScheduleRecordOf<T>,
    schedule_id: &T::ScheduleId,
    from: &T::AccountId,
    to: &T::AccountId,
    amount: Balance,
) -> Result<ScheduleRecordOf<T>, Error<T::ScheduleId, T::AccountId>> {
    let balance = record.balance_of(from);
    if amount > balance {
        return Err(Error::InsufficientBalance {
            holder: from.clone(),
            schedule_id: schedule_id.clone(),
            balance,
            requested: amount,
        });
    }

    let mut working = record.clone();
    working.transfer(from, to, amount)?;
    Ok(working)
}

impl<T: Config> Ledger<T> {
    /// Log and emit a committed transfer.
    fn transferred(
        &self,
        schedule_id: T::ScheduleId,
        from: T::AccountId,
        to: T::AccountId,
        amount: Balance,
    ) {
        debug!(message = "transferred", ?schedule_id, ?from, ?to, amount);
        if amount > 0 {
            self.emit(Event::Transferred {
                schedule_id,
                from,
                to,
                amount,
            });
        }
    }
}

#[async_trait::async_trait]
impl<T: Config> LogicOp<Request<T::ScheduleId, T::AccountId>> for Ledger<T> {
    type Response = Response;
    type Error = Error<T::ScheduleId, T::AccountId>;

    async fn call(
        &self,
        req: Request<T::ScheduleId, T::AccountId>,
    ) -> Result<Self::Response, Self::Error> {
        let Request {
            schedule_id,
            from,
            to,
            amount,
        } = req;

        let handle = self
            .schedule_handle(&schedule_id)
            .await
            .ok_or_else(|| Error::ScheduleNotFound(schedule_id.clone()))?;
        let mut record = handle.lock().await;

        let working = apply::<T>(&record, &schedule_id, &from, &to, amount)?;
        let response = Response {
            from_balance: working.balance_of(&from),
            to_balance: working.balance_of(&to),
        };
        *record = working;

        self.transferred(schedule_id, from, to, amount);
        Ok(response)
    }
}

#[async_trait::async_trait]
impl<T: Config> LogicOp<BatchRequest<T::ScheduleId, T::AccountId>> for Ledger<T> {
    type Response = BatchResponse<T::ScheduleId>;
    type Error = Error<T::ScheduleId, T::AccountId>;

    async fn call(
        &self,
        req: BatchRequest<T::ScheduleId, T::AccountId>,
    ) -> Result<Self::Response, Self::Error> {
        let BatchRequest { from, to, items } = req;

        let mut merged: BTreeMap<T::ScheduleId, Balance> = BTreeMap::new();
        for (schedule_id, amount) in items {
            let total = merged.entry(schedule_id).or_default();
            *total = total.checked_add(amount).ok_or(ReleaseError::Overflow)?;
        }

        let handles = {
            let schedules = self.schedules.read().await;
            merged
                .keys()
                .map(|schedule_id| {
                    schedules
                        .get(schedule_id)
                        .map(Arc::clone)
                        .ok_or_else(|| Error::ScheduleNotFound(schedule_id.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        // Always lock in key order.
        let mut guards = Vec::with_capacity(handles.len());
        for handle in handles {
            guards.push(handle.lock_owned().await);
        }

        let mut updated = Vec::with_capacity(guards.len());
        for ((schedule_id, amount), guard) in merged.iter().zip(&guards) {
            updated.push(apply::<T>(guard, schedule_id, &from, &to, *amount)?);
        }

        for (guard, record) in guards.iter_mut().zip(updated) {
            **guard = record;
        }

        let transferred: Vec<_> = merged.into_iter().collect();
        for (schedule_id, amount) in &transferred {
            self.transferred(schedule_id.clone(), from.clone(), to.clone(), *amount);
        }
        Ok(BatchResponse { transferred })
    }
}
