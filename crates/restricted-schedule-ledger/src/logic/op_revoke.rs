//! Revoke operation.

use schedule_release_linear::ReleaseError;
use tracing::{info, warn};

use super::LogicOp;
use crate::{types::Balance, Config, CustodianErrorOf, Event, Ledger, ValueCustodian};

/// The request of the revoke operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request<ScheduleId, AccountId> {
    /// The schedule to revoke from.
    pub schedule_id: ScheduleId,
    /// Who receives the revoked value.
    pub recipient: AccountId,
    /// The amount to revoke; zero revokes everything currently revocable.
    pub amount: Balance,
}

/// The response of the revoke operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response<AccountId> {
    /// The revoked amount.
    pub revoked: Balance,
    /// The release floor after the revocation.
    pub release_floor: Balance,
    /// The amount taken from each holder; sums up to `revoked`.
    pub shares: Vec<(AccountId, Balance)>,
}

/// Errors for the revoke operation.
#[derive(Debug, thiserror::Error)]
pub enum Error<ScheduleId, DeliveryError> {
    /// The schedule does not exist.
    #[error("schedule {0:?} not found")]
    ScheduleNotFound(ScheduleId),
    /// The requested amount is above the unreleased outstanding value.
    #[error("insufficient unreleased tokens in schedule {schedule_id:?}: {requested} requested, {revocable} revocable")]
    InsufficientUnreleasedTokens {
        /// The schedule.
        schedule_id: ScheduleId,
        /// What was requested.
        requested: Balance,
        /// What can be revoked right now.
        revocable: Balance,
    },
    /// The revocation does not fit the schedule totals.
    #[error("arithmetic: {0}")]
    Arithmetic(#[from] ReleaseError),
    /// The custodian did not deliver the value; nothing was revoked.
    #[error("delivery failed: {0}")]
    Delivery(#[source] DeliveryError),
}

#[async_trait::async_trait]
impl<T: Config> LogicOp<Request<T::ScheduleId, T::AccountId>> for Ledger<T> {
    type Response = Response<T::AccountId>;
    type Error = Error<T::ScheduleId, CustodianErrorOf<T>>;

    async fn call(
        &self,
        req: Request<T::ScheduleId, T::AccountId>,
    ) -> Result<Self::Response, Self::Error> {
        let Request {
            schedule_id,
            recipient,
            amount: requested,
        } = req;

        let handle = self
            .schedule_handle(&schedule_id)
            .await
            .ok_or_else(|| Error::ScheduleNotFound(schedule_id.clone()))?;
        let mut record = handle.lock().await;

        let now = self.now();
        let revocable = record.revocable_at(now)?;
        let amount = if requested == 0 { revocable } else { requested };
        if amount > revocable {
            return Err(Error::InsufficientUnreleasedTokens {
                schedule_id,
                requested,
                revocable,
            });
        }
        if amount == 0 {
            return Ok(Response {
                revoked: 0,
                release_floor: record.totals.release_floor,
                shares: Vec::new(),
            });
        }

        // The floor has to be taken against the basis before it shrinks.
        let released = record.released_at(now)?;
        let mut working = record.clone();
        let shares = working.revoke(amount, released)?;

        if let Err(error) = self.custodian.deliver(&recipient, amount).await {
            warn!(
                message = "revocation delivery failed, rolling back",
                ?schedule_id,
                ?recipient,
                amount,
                %error
            );
            return Err(Error::Delivery(error));
        }

        let release_floor = working.totals.release_floor;
        *record = working;

        info!(
            message = "revoked",
            ?schedule_id,
            ?recipient,
            amount,
            release_floor,
            ?shares
        );
        self.emit(Event::Revoked {
            schedule_id,
            recipient,
            amount,
            release_floor,
            shares: shares.clone(),
        });

        Ok(Response {
            revoked: amount,
            release_floor,
            shares,
        })
    }
}
