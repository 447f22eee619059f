//! The table of release durations.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::types::{DurationKey, Moment};

/// `(methodology, version) -> duration` lookup.
///
/// Only the duration present at schedule creation matters to a schedule, so the table can be
/// changed at any time.
#[derive(Debug)]
pub struct DurationTable<Methodology> {
    /// The entries.
    entries: RwLock<BTreeMap<DurationKey<Methodology>, Moment>>,
}

impl<Methodology: Ord> Default for DurationTable<Methodology> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Methodology: Ord> DurationTable<Methodology> {
    /// An empty table.
    pub fn new() -> Self {
        Self::from_entries(BTreeMap::new())
    }

    /// A table with the given entries.
    pub fn from_entries(entries: BTreeMap<DurationKey<Methodology>, Moment>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Set the duration for the key, returning the previous one.
    pub async fn set(&self, key: DurationKey<Methodology>, duration: Moment) -> Option<Moment> {
        self.entries.write().await.insert(key, duration)
    }

    /// Get the duration for the key.
    pub async fn get(&self, key: &DurationKey<Methodology>) -> Option<Moment> {
        self.entries.read().await.get(key).copied()
    }

    /// A snapshot of all entries, in key order.
    pub async fn entries(&self) -> Vec<(DurationKey<Methodology>, Moment)>
    where
        Methodology: Clone,
    {
        self.entries
            .read()
            .await
            .iter()
            .map(|(key, duration)| (key.clone(), *duration))
            .collect()
    }
}
