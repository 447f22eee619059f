//! The mocks for the ledger testing.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use mockall::mock;
use serde::{Deserialize, Serialize};

use crate::{
    genesis::LedgerGenesisOf,
    traits::{Clock, EventHandler, ValueCustodian},
    types::{Balance, Moment},
    Config, EventOf, Ledger,
};

pub(crate) const YEAR: Moment = 365 * 24 * 60 * 60;
pub(crate) const T0: Moment = 1_700_000_000;

pub(crate) const CARBON: Methodology = Methodology::Carbon;
pub(crate) const TEN_YEARS: Moment = 10 * YEAR;

pub(crate) const PROJECT_A: u32 = 1;
pub(crate) const PROJECT_B: u32 = 2;
pub(crate) const PROJECT_C: u32 = 3;

pub(crate) const ALICE: u64 = 10;
pub(crate) const BOB: u64 = 20;
pub(crate) const CAROL: u64 = 30;
pub(crate) const TREASURY: u64 = 99;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Methodology {
    Carbon,
    Biodiversity,
}

pub enum Test {}

impl Config for Test {
    type ScheduleId = u32;
    type AccountId = u64;
    type Methodology = Methodology;
    type Custodian = MockCustodian;
    type Clock = ManualClock;
    type EventHandler = EventRecorder;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("delivery refused")]
pub struct DeliveryRefused;

mock! {
    pub Custodian {}

    #[async_trait::async_trait]
    impl ValueCustodian<u64> for Custodian {
        type Error = DeliveryRefused;

        async fn deliver(&self, recipient: &u64, amount: Balance) -> Result<(), DeliveryRefused>;
    }
}

/// A custodian accepting every delivery.
pub fn accepting_custodian() -> MockCustodian {
    let mut custodian = MockCustodian::new();
    custodian.expect_deliver().returning(|_, _| Ok(()));
    custodian
}

#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn at(now: Moment) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub fn set(&self, now: Moment) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Moment) {
        self.0.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Moment {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventRecorder(Arc<std::sync::Mutex<Vec<EventOf<Test>>>>);

impl EventRecorder {
    pub fn take(&self) -> Vec<EventOf<Test>> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl EventHandler<u32, u64, Methodology> for EventRecorder {
    fn on_event(&self, event: EventOf<Test>) {
        self.0.lock().unwrap().push(event);
    }
}

/// The ledger under test, plus the handles to drive it.
pub struct TestLedger {
    pub ledger: Ledger<Test>,
    pub clock: ManualClock,
    pub events: EventRecorder,
}

pub fn new_test_ledger(custodian: MockCustodian) -> TestLedger {
    let clock = ManualClock::at(T0);
    let events = EventRecorder::default();
    let ledger = Ledger::new(custodian, clock.clone(), events.clone());
    TestLedger {
        ledger,
        clock,
        events,
    }
}

pub fn new_test_ledger_from_genesis(
    genesis: LedgerGenesisOf<Test>,
    custodian: MockCustodian,
) -> TestLedger {
    let clock = ManualClock::at(T0);
    let events = EventRecorder::default();
    let ledger = Ledger::from_genesis(genesis, custodian, clock.clone(), events.clone()).unwrap();
    TestLedger {
        ledger,
        clock,
        events,
    }
}
