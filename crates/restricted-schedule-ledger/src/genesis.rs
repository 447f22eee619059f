//! Ledger genesis and state export.

use std::{
    collections::{btree_map::Entry, BTreeMap},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::{
    schedule::InvariantViolation,
    types::{DurationKey, MethodologyVersion, Moment, ScheduleRecord},
    Config, DurationTable, Ledger,
};

/// A release duration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DurationEntry<Methodology> {
    /// The methodology.
    pub methodology: Methodology,
    /// The methodology version.
    pub version: MethodologyVersion,
    /// The release duration, in seconds.
    pub duration: Moment,
}

/// A schedule to start the ledger with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenesisSchedule<ScheduleId, AccountId: Ord, Methodology> {
    /// The schedule id.
    pub schedule_id: ScheduleId,
    /// The stored schedule state.
    pub record: ScheduleRecord<AccountId, Methodology>,
}

/// The initial state of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LedgerGenesis<ScheduleId, AccountId: Ord, Methodology> {
    /// The release durations.
    pub durations: Vec<DurationEntry<Methodology>>,
    /// The schedules.
    pub schedules: Vec<GenesisSchedule<ScheduleId, AccountId, Methodology>>,
}

impl<ScheduleId, AccountId: Ord, Methodology> Default
    for LedgerGenesis<ScheduleId, AccountId, Methodology>
{
    fn default() -> Self {
        Self {
            durations: Vec::new(),
            schedules: Vec::new(),
        }
    }
}

/// The genesis from a given config.
pub type LedgerGenesisOf<T> =
    LedgerGenesis<<T as Config>::ScheduleId, <T as Config>::AccountId, <T as Config>::Methodology>;

/// An error that can happen while building the ledger from genesis.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GenesisError<ScheduleId, Methodology> {
    /// The same duration key is listed twice.
    #[error("duplicate release duration for {methodology:?} version {version}")]
    DuplicateDuration {
        /// The methodology.
        methodology: Methodology,
        /// The methodology version.
        version: MethodologyVersion,
    },
    /// The same schedule is listed twice.
    #[error("duplicate schedule {0:?}")]
    DuplicateSchedule(ScheduleId),
    /// A schedule record is not consistent.
    #[error("schedule {schedule_id:?} is inconsistent: {source}")]
    Invariant {
        /// The schedule.
        schedule_id: ScheduleId,
        /// The violated invariant.
        source: InvariantViolation,
    },
}

impl<T: Config> Ledger<T> {
    /// Build a ledger from the genesis state.
    pub fn from_genesis(
        genesis: LedgerGenesisOf<T>,
        custodian: T::Custodian,
        clock: T::Clock,
        events: T::EventHandler,
    ) -> Result<Self, GenesisError<T::ScheduleId, T::Methodology>> {
        let LedgerGenesis {
            durations,
            schedules,
        } = genesis;

        let mut duration_entries = BTreeMap::new();
        for DurationEntry {
            methodology,
            version,
            duration,
        } in durations
        {
            let key = DurationKey {
                methodology,
                version,
            };
            match duration_entries.entry(key) {
                Entry::Occupied(entry) => {
                    let key = entry.key();
                    return Err(GenesisError::DuplicateDuration {
                        methodology: key.methodology.clone(),
                        version: key.version,
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(duration);
                }
            }
        }

        let mut schedule_entries = BTreeMap::new();
        for GenesisSchedule {
            schedule_id,
            record,
        } in schedules
        {
            record
                .check_invariants()
                .map_err(|source| GenesisError::Invariant {
                    schedule_id: schedule_id.clone(),
                    source,
                })?;
            match schedule_entries.entry(schedule_id) {
                Entry::Occupied(entry) => {
                    return Err(GenesisError::DuplicateSchedule(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(Mutex::new(record)));
                }
            }
        }

        info!(
            message = "ledger built from genesis",
            durations = duration_entries.len(),
            schedules = schedule_entries.len()
        );

        Ok(Self {
            durations: DurationTable::from_entries(duration_entries),
            schedules: RwLock::new(schedule_entries),
            custodian,
            clock,
            events,
        })
    }

    /// Export the current state in the genesis shape.
    pub async fn export_genesis(&self) -> LedgerGenesisOf<T> {
        let durations = self
            .durations
            .entries()
            .await
            .into_iter()
            .map(|(key, duration)| DurationEntry {
                methodology: key.methodology,
                version: key.version,
                duration,
            })
            .collect();

        let schedules = self.schedules.read().await;
        let mut exported = Vec::with_capacity(schedules.len());
        for (schedule_id, handle) in schedules.iter() {
            let record = handle.lock().await;
            exported.push(GenesisSchedule {
                schedule_id: schedule_id.clone(),
                record: record.clone(),
            });
        }

        LedgerGenesis {
            durations,
            schedules: exported,
        }
    }
}
