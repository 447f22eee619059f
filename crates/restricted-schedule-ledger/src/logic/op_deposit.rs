//! Deposit operation.

use std::{collections::btree_map::Entry, sync::Arc};

use schedule_release_linear::{ReleaseError, ReleaseWindow, WindowError};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::LogicOp;
use crate::{
    types::{Balance, DurationKey, MethodologyVersion, Moment, ScheduleRecord},
    Config, Event, Ledger,
};

/// The request of the deposit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<ScheduleId, AccountId, Methodology> {
    /// The schedule to deposit into.
    pub schedule_id: ScheduleId,
    /// The methodology to take the release duration from if the schedule is new.
    pub methodology: Methodology,
    /// The methodology version to take the release duration from if the schedule is new.
    pub version: MethodologyVersion,
    /// The holder to credit.
    pub holder: AccountId,
    /// The amount to deposit.
    pub amount: Balance,
    /// The start of the release window if the schedule is new.
    /// Ignored for existing schedules.
    pub start_time_if_new: Moment,
}

/// The response of the deposit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Whether this deposit created the schedule.
    pub created: bool,
    /// The holder balance after the deposit.
    pub balance: Balance,
}

/// Errors for the deposit operation.
#[derive(Debug, thiserror::Error)]
pub enum Error<ScheduleId, Methodology> {
    /// The schedule does not exist and there is no release duration to create it with.
    #[error("release duration is not configured for {methodology:?} version {version}")]
    DurationNotConfigured {
        /// The methodology.
        methodology: Methodology,
        /// The methodology version.
        version: MethodologyVersion,
    },
    /// The release window of the new schedule would be empty or out of range.
    #[error("invalid release window for schedule {schedule_id:?}: {source}")]
    InvalidWindow {
        /// The schedule that was being created.
        schedule_id: ScheduleId,
        /// The window error.
        source: WindowError,
    },
    /// The deposit does not fit the schedule totals.
    #[error("arithmetic: {0}")]
    Arithmetic(#[from] ReleaseError),
}

#[async_trait::async_trait]
impl<T: Config> LogicOp<Request<T::ScheduleId, T::AccountId, T::Methodology>> for Ledger<T> {
    type Response = Response;
    type Error = Error<T::ScheduleId, T::Methodology>;

    async fn call(
        &self,
        req: Request<T::ScheduleId, T::AccountId, T::Methodology>,
    ) -> Result<Self::Response, Self::Error> {
        let Request {
            schedule_id,
            methodology,
            version,
            holder,
            amount,
            start_time_if_new,
        } = req;

        let (handle, created) = match self.schedule_handle(&schedule_id).await {
            Some(handle) => (handle, false),
            None => {
                let key = DurationKey {
                    methodology,
                    version,
                };
                let duration = self.durations.get(&key).await.ok_or_else(|| {
                    Error::DurationNotConfigured {
                        methodology: key.methodology.clone(),
                        version: key.version,
                    }
                })?;
                let window = ReleaseWindow::open(start_time_if_new, duration).map_err(
                    |source| Error::InvalidWindow {
                        schedule_id: schedule_id.clone(),
                        source,
                    },
                )?;

                let mut schedules = self.schedules.write().await;
                let (handle, created) = match schedules.entry(schedule_id.clone()) {
                    // Created concurrently while the duration was looked up.
                    Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
                    Entry::Vacant(entry) => {
                        let record = ScheduleRecord::new(key.clone(), window);
                        let handle = Arc::new(Mutex::new(record));
                        entry.insert(Arc::clone(&handle));
                        (handle, true)
                    }
                };
                if created {
                    info!(message = "schedule created", ?schedule_id, ?key, ?window);
                    self.emit(Event::ScheduleCreated {
                        schedule_id: schedule_id.clone(),
                        key,
                        window,
                    });
                }
                drop(schedules);

                (handle, created)
            }
        };

        let mut record = handle.lock().await;
        let mut working = record.clone();
        working.deposit(&holder, amount)?;
        let balance = working.balance_of(&holder);
        *record = working;

        debug!(message = "deposited", ?schedule_id, ?holder, amount, balance);
        if amount > 0 {
            self.emit(Event::Deposited {
                schedule_id,
                holder,
                amount,
            });
        }

        Ok(Response { created, balance })
    }
}
