//! Claim operation.

use schedule_release_linear::ReleaseError;
use tracing::{debug, warn};

use super::LogicOp;
use crate::{types::Balance, Config, CustodianErrorOf, Event, Ledger, ValueCustodian};

/// The request of the claim operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<ScheduleId, AccountId> {
    /// The schedule to claim from.
    pub schedule_id: ScheduleId,
    /// The holder whose balance is claimed.
    pub holder: AccountId,
    /// Who receives the claimed value.
    pub recipient: AccountId,
    /// The amount to claim.
    pub amount: Balance,
}

/// The response of the claim operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The claimed amount.
    pub claimed: Balance,
    /// The holder balance left in the schedule.
    pub remaining_balance: Balance,
}

/// Errors for the claim operation.
#[derive(Debug, thiserror::Error)]
pub enum Error<ScheduleId, AccountId, DeliveryError> {
    /// The schedule does not exist.
    #[error("schedule {0:?} not found")]
    ScheduleNotFound(ScheduleId),
    /// The requested amount is above what the holder can claim right now.
    #[error("insufficient claimable balance of {holder:?} in schedule {schedule_id:?}: {claimable} available")]
    InsufficientClaimableBalance {
        /// The holder.
        holder: AccountId,
        /// The schedule.
        schedule_id: ScheduleId,
        /// What the holder can claim right now.
        claimable: Balance,
    },
    /// The claim does not fit the schedule totals.
    #[error("arithmetic: {0}")]
    Arithmetic(#[from] ReleaseError),
    /// The custodian did not deliver the value; nothing was claimed.
    #[error("delivery failed: {0}")]
    Delivery(#[source] DeliveryError),
}

#[async_trait::async_trait]
impl<T: Config> LogicOp<Request<T::ScheduleId, T::AccountId>> for Ledger<T> {
    type Response = Response;
    type Error = Error<T::ScheduleId, T::AccountId, CustodianErrorOf<T>>;

    async fn call(
        &self,
        req: Request<T::ScheduleId, T::AccountId>,
    ) -> Result<Self::Response, Self::Error> {
        let Request {
            schedule_id,
            holder,
            recipient,
            amount,
        } = req;

        let handle = self
            .schedule_handle(&schedule_id)
            .await
            .ok_or_else(|| Error::ScheduleNotFound(schedule_id.clone()))?;
        let mut record = handle.lock().await;

        if amount == 0 {
            return Ok(Response {
                claimed: 0,
                remaining_balance: record.balance_of(&holder),
            });
        }

        let claimable = record.claimable_for_account_at(&holder, self.now())?;
        if amount > claimable {
            return Err(Error::InsufficientClaimableBalance {
                holder,
                schedule_id,
                claimable,
            });
        }

        let mut working = record.clone();
        working.claim(&holder, amount)?;

        if let Err(error) = self.custodian.deliver(&recipient, amount).await {
            warn!(
                message = "claim delivery failed, rolling back",
                ?schedule_id,
                ?holder,
                ?recipient,
                amount,
                %error
            );
            return Err(Error::Delivery(error));
        }

        let remaining_balance = working.balance_of(&holder);
        *record = working;

        debug!(
            message = "claimed",
            ?schedule_id,
            ?holder,
            ?recipient,
            amount,
            remaining_balance
        );
        self.emit(Event::Claimed {
            schedule_id,
            holder,
            recipient,
            amount,
        });

        Ok(Response {
            claimed: amount,
            remaining_balance,
        })
    }
}
