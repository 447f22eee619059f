//! The capabilities the ledger is driven with.

use crate::{
    event::Event,
    types::{Balance, Moment},
};

/// The custodian of the underlying value.
///
/// The ledger only does the bookkeeping; the custodian is the one actually moving the value out
/// when a claim or a revocation happens.
#[async_trait::async_trait]
pub trait ValueCustodian<AccountId>: Send + Sync {
    /// Delivery error.
    /// Error may originate from the underlying transfer failing, from a transport failure, etc.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver `amount` of the value to the `recipient`.
    ///
    /// Nothing is committed to the ledger unless this succeeds.
    async fn deliver(&self, recipient: &AccountId, amount: Balance) -> Result<(), Self::Error>;
}

/// The source of the current moment.
pub trait Clock: Send + Sync {
    /// The current moment, in seconds.
    fn now(&self) -> Moment;
}

/// A [`Clock`] reading the UNIX time of the system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Moment {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or_default()
    }
}

/// Observer of the committed ledger changes.
pub trait EventHandler<ScheduleId, AccountId, Methodology>: Send + Sync {
    /// Handle an event.
    fn on_event(&self, event: Event<ScheduleId, AccountId, Methodology>);
}

impl<ScheduleId, AccountId, Methodology> EventHandler<ScheduleId, AccountId, Methodology> for () {
    fn on_event(&self, _event: Event<ScheduleId, AccountId, Methodology>) {}
}
