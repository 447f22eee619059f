//! Custom types we use.

use std::collections::BTreeMap;

use codec::{Decode, Encode};
use scale_info::TypeInfo;
use schedule_release_linear::{traits::SimpleFracScaler, ReleaseState, ReleaseWindow};
use serde::{Deserialize, Serialize};

/// The amount of restricted value.
pub type Balance = u128;

/// A point in time, in seconds.
pub type Moment = u64;

/// The version of a methodology.
pub type MethodologyVersion = u32;

/// Scales a balance by an elapsed fraction of the release window.
pub type TimeScaler = SimpleFracScaler<num::BigUint, Balance, Moment>;

/// Scales a balance by a holder's share of the outstanding balance.
pub type ShareScaler = SimpleFracScaler<num::BigUint, Balance, Balance>;

/// The key of the duration table.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(deny_unknown_fields)]
pub struct DurationKey<Methodology> {
    /// The methodology.
    pub methodology: Methodology,
    /// The methodology version.
    pub version: MethodologyVersion,
}

/// Per-holder bookkeeping kept for reporting only.
///
/// Claim rights are always recomputed from the current balances; these counters survive the
/// holder's balance dropping to zero.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
#[serde(deny_unknown_fields)]
pub struct HolderHistory {
    /// Everything this holder has claimed.
    pub claimed: Balance,
    /// Everything revoked from this holder.
    pub revoked: Balance,
}

/// The stored state of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleRecord<AccountId: Ord, Methodology> {
    /// The duration table key the schedule was created with.
    pub duration_key: DurationKey<Methodology>,
    /// The release window, fixed at creation.
    pub window: ReleaseWindow<Moment>,
    /// The schedule-level totals.
    pub totals: ReleaseState<Balance>,
    /// Outstanding balances; every entry is non-zero.
    pub holders: BTreeMap<AccountId, Balance>,
    /// Per-holder claim and revocation history.
    pub history: BTreeMap<AccountId, HolderHistory>,
}
