//! # Late-Fee Core
//!
//! Pure domain logic for the monthly late-fee charge pipeline. No I/O
//! lives here — everything in this crate is deterministic given its
//! inputs, which is what makes the reconciliation and fee rules
//! testable without either external API.
//!
//! ## Modules
//!
//! - [`model`] — canonical data model shared by the clients and the
//!   pipeline (delinquency rows, tenant records, charge rows, the bulk
//!   submission wire item).
//! - [`normalize`] — currency/date normalization for the heterogeneous
//!   string/number values the reporting API emits.
//! - [`fee`] — the jurisdiction-dependent statutory late-fee formula.
//! - [`reconcile`] — cross-system occupancy identity resolution and
//!   the charge-row builder.
//! - [`dedupe`] — duplicate-tenancy detection over built charge rows.

pub mod dedupe;
pub mod fee;
pub mod model;
pub mod normalize;
pub mod reconcile;

pub use dedupe::{compute_duplicates, DuplicateSets};
pub use fee::{compute_late_fee, round_cents, LateFeeParams, LateFeeSchedule, PropertyGroup};
pub use model::{BulkChargeItem, ChargeRow, DelinquencyRow, TenantDirectoryEntry, V0Tenant};
pub use reconcile::{
    build_charge_rows, build_occupancy_maps, retry_mapping_with_wide_tenants, BuildContext,
    OccupancyMaps,
};
