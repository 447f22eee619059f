//! Restricted schedule ledger.
//!
//! Tracks time-locked value owed to the holders of named schedules, releases it linearly over the
//! schedule window, and supports early claims, transfers between holders and revocation of the
//! unreleased part.

#![warn(
    missing_docs,
    clippy::missing_docs_in_private_items,
    clippy::clone_on_ref_ptr
)]

use std::{collections::BTreeMap, fmt::Debug, sync::Arc};

use tokio::sync::{Mutex, RwLock};

pub mod duration_table;
pub mod event;
pub mod genesis;
pub mod logic;
pub mod query;
pub mod schedule;
pub mod traits;
pub mod types;

#[cfg(test)]
mod mock;

pub use duration_table::DurationTable;
pub use event::Event;
pub use schedule_release_linear::{ReleaseError, ReleaseWindow, WindowError};
pub use traits::{Clock, EventHandler, SystemClock, ValueCustodian};
pub use types::{Balance, DurationKey, MethodologyVersion, Moment, ScheduleRecord};

/// The ledger configuration.
///
/// Binds the identifier types and the capabilities the ledger is driven with.
pub trait Config: Send + Sync + 'static {
    /// The schedule identifier.
    type ScheduleId: Ord + Clone + Debug + Send + Sync + 'static;

    /// The holder and recipient identifier.
    type AccountId: Ord + Clone + Debug + Send + Sync + 'static;

    /// The methodology the release durations are configured for.
    type Methodology: Ord + Clone + Debug + Send + Sync + 'static;

    /// The custodian delivering claimed and revoked value.
    type Custodian: ValueCustodian<Self::AccountId>;

    /// The source of the current moment.
    type Clock: Clock;

    /// The handler of the committed changes.
    type EventHandler: EventHandler<Self::ScheduleId, Self::AccountId, Self::Methodology>;
}

/// The schedule record from a given config.
pub type ScheduleRecordOf<T> =
    ScheduleRecord<<T as Config>::AccountId, <T as Config>::Methodology>;
/// The event from a given config.
pub type EventOf<T> =
    Event<<T as Config>::ScheduleId, <T as Config>::AccountId, <T as Config>::Methodology>;
/// The custodian error from a given config.
pub type CustodianErrorOf<T> =
    <<T as Config>::Custodian as ValueCustodian<<T as Config>::AccountId>>::Error;

/// A schedule behind its own lock.
type ScheduleHandle<T> = Arc<Mutex<ScheduleRecordOf<T>>>;

/// The ledger.
///
/// Operations on a single schedule are serialized by that schedule's mutex; operations on
/// different schedules run independently. The map itself is only write-locked to insert a new
/// schedule.
pub struct Ledger<T: Config> {
    /// The release durations.
    pub(crate) durations: DurationTable<T::Methodology>,
    /// All the schedules ever created.
    pub(crate) schedules: RwLock<BTreeMap<T::ScheduleId, ScheduleHandle<T>>>,
    /// The value custodian.
    pub(crate) custodian: T::Custodian,
    /// The clock.
    pub(crate) clock: T::Clock,
    /// The event handler.
    pub(crate) events: T::EventHandler,
}

impl<T: Config> Ledger<T> {
    /// An empty ledger.
    pub fn new(custodian: T::Custodian, clock: T::Clock, events: T::EventHandler) -> Self {
        Self {
            durations: DurationTable::new(),
            schedules: RwLock::new(BTreeMap::new()),
            custodian,
            clock,
            events,
        }
    }

    /// The current moment according to the configured clock.
    pub fn now(&self) -> Moment {
        self.clock.now()
    }

    /// Get the release duration configured for the methodology version.
    pub async fn get_duration(
        &self,
        methodology: T::Methodology,
        version: MethodologyVersion,
    ) -> Option<Moment> {
        self.durations
            .get(&DurationKey {
                methodology,
                version,
            })
            .await
    }

    /// The ids of all the schedules, in order.
    pub async fn schedule_ids(&self) -> Vec<T::ScheduleId> {
        self.schedules.read().await.keys().cloned().collect()
    }

    /// Get the lock of an existing schedule.
    pub(crate) async fn schedule_handle(
        &self,
        schedule_id: &T::ScheduleId,
    ) -> Option<ScheduleHandle<T>> {
        self.schedules.read().await.get(schedule_id).map(Arc::clone)
    }

    /// Hand a committed change to the event handler.
    pub(crate) fn emit(&self, event: EventOf<T>) {
        self.events.on_event(event);
    }
}
