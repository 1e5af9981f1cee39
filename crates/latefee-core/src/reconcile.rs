//! # Occupancy Identity Reconciliation
//!
//! The two property-management systems key the same physical tenancy
//! differently, and a single reporting-side occupancy can fan out to
//! several tenant records. This module builds the cross-reference
//! indexes between the two tenant datasets, resolves each delinquency
//! row to its transactional occupancy ID, and assembles the final
//! charge rows.
//!
//! ## Resolution order
//!
//! Per row:
//! 1. find the reporting occupancy UID (the row's own occupancy ID if
//!    it is a known UID, else the property+unit composite key, else
//!    the occupancy-ID cross-reference);
//! 2. pick one integration ID from the UID's candidate list
//!    (current/notice status preferred, else first);
//! 3. resolve the transactional occupancy by tenant ID, then
//!    integration ID, then unit ID — first non-empty wins.
//!
//! An unresolved row is a normal outcome, not an error; it is counted
//! and excluded from submission downstream.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::fee::{compute_late_fee, round_cents, LateFeeSchedule};
use crate::model::{ChargeRow, DelinquencyRow, TenantDirectoryEntry, V0Tenant};
use crate::normalize::{last_comma_first_to_first_last, late_fee_description, parse_currency, to_ymd};

/// One directory entry under an occupancy UID: the integration ID it
/// carries and the tenant's lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub integration_id: String,
    pub status: String,
}

/// Indexes over the transactional tenant list (keys on that system's
/// identifiers). Rebuilt alone during the widen-retry pass.
#[derive(Debug, Default)]
struct V0Maps {
    /// Transactional tenant ID → transactional occupancy ID.
    tenant_id_to_occ: HashMap<String, String>,
    /// Integration ID (or external-ID fallback) → occupancy ID.
    integration_id_to_occ: HashMap<String, String>,
    /// Unit ID → occupancy ID. Populated only from current/notice
    /// tenants; the first such tenant per unit wins.
    unit_id_to_occ: HashMap<String, String>,
}

/// All cross-reference indexes needed to resolve one batch of
/// delinquency rows. Built fresh per pipeline run.
#[derive(Debug, Default)]
pub struct OccupancyMaps {
    v0: V0Maps,
    /// Reporting occupancy UID → ordered candidate list (fan-out
    /// preserved in directory order).
    occ_uid_to_candidates: HashMap<String, Vec<Candidate>>,
    /// `lowercase(property)||lowercase(unit)` → occupancy UID.
    occ_uid_by_prop_unit: HashMap<String, String>,
    /// Reporting occupancy ID → occupancy UID (first wins).
    occ_id_to_occ_uid: HashMap<String, String>,
}

impl OccupancyMaps {
    /// Candidates recorded for an occupancy UID, if any.
    pub fn candidates_for(&self, occ_uid: &str) -> Option<&[Candidate]> {
        self.occ_uid_to_candidates.get(occ_uid).map(Vec::as_slice)
    }
}

/// Context for one charge-row build pass. `today` is captured once at
/// the start of the run so filtering and fallback dates are
/// deterministic for the whole batch.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// GL account number displayed on built rows.
    pub gl_account_number: String,
    /// Description prefix, e.g. `"IL Custom Late Fee"`.
    pub description_prefix: String,
    /// Jurisdiction schedule for fee parameters.
    pub schedule: LateFeeSchedule,
    /// The run's notion of "today" (UTC).
    pub today: NaiveDate,
}

fn prop_unit_key(property: &str, unit: &str) -> String {
    format!(
        "{}||{}",
        property.trim().to_lowercase(),
        unit.trim().to_lowercase()
    )
}

fn is_active_status(status: &str) -> bool {
    matches!(status.to_lowercase().as_str(), "current" | "notice")
}

fn build_v0_maps(v0_tenants: &[V0Tenant]) -> V0Maps {
    let mut maps = V0Maps::default();

    for t in v0_tenants {
        let tenant_id = t.id.trim();
        let integration_id = if t.integration_id.trim().is_empty() {
            t.external_id.trim()
        } else {
            t.integration_id.trim()
        };
        let occ = t.occupancy_id.trim();
        let unit_id = t.unit_id.trim();

        if occ.is_empty() {
            continue;
        }
        if !tenant_id.is_empty() {
            maps.tenant_id_to_occ
                .insert(tenant_id.to_string(), occ.to_string());
        }
        if !integration_id.is_empty() {
            maps.integration_id_to_occ
                .insert(integration_id.to_string(), occ.to_string());
        }
        // First current/notice tenant per unit wins; later tenants on
        // the same unit never displace it.
        if !unit_id.is_empty() && is_active_status(&t.status) {
            maps.unit_id_to_occ
                .entry(unit_id.to_string())
                .or_insert_with(|| occ.to_string());
        }
    }

    maps
}

/// Build all reconciliation indexes from the two tenant datasets.
pub fn build_occupancy_maps(
    v0_tenants: &[V0Tenant],
    directory: &[TenantDirectoryEntry],
) -> OccupancyMaps {
    let mut maps = OccupancyMaps {
        v0: build_v0_maps(v0_tenants),
        ..OccupancyMaps::default()
    };

    for entry in directory {
        let occ_uid = entry.occupancy_import_uid.trim();
        let integration_id = entry.tenant_integration_id.trim();
        let status = entry.status.trim().to_lowercase();

        if !occ_uid.is_empty() && !integration_id.is_empty() {
            maps.occ_uid_to_candidates
                .entry(occ_uid.to_string())
                .or_default()
                .push(Candidate {
                    integration_id: integration_id.to_string(),
                    status,
                });
        }

        // Property+unit fallback. The directory is queried with
        // varying column sets, so both column spellings are checked.
        let property = if entry.property_name.is_empty() {
            &entry.property
        } else {
            &entry.property_name
        };
        let unit = if entry.unit.is_empty() {
            &entry.unit_name
        } else {
            &entry.unit
        };
        if !occ_uid.is_empty() && (!property.is_empty() || !unit.is_empty()) {
            maps.occ_uid_by_prop_unit
                .insert(prop_unit_key(property, unit), occ_uid.to_string());
        }

        let occ_id = entry.occupancy_id.trim();
        if !occ_id.is_empty() && !occ_uid.is_empty() {
            maps.occ_id_to_occ_uid
                .entry(occ_id.to_string())
                .or_insert_with(|| occ_uid.to_string());
        }
    }

    maps
}

/// Pick one integration ID from an occupancy's candidate list: the
/// first current/notice candidate, else the first candidate.
fn pick_integration_id(candidates: &[Candidate]) -> String {
    for c in candidates {
        if is_active_status(&c.status) {
            return c.integration_id.trim().to_string();
        }
    }
    candidates
        .first()
        .map(|c| c.integration_id.trim().to_string())
        .unwrap_or_default()
}

/// The fixed three-step transactional-occupancy lookup. Priority is
/// tenant ID, then integration ID, then unit ID.
fn resolve_v0_occupancy(maps: &V0Maps, integration_id: &str, v2_unit_id: &str) -> String {
    if let Some(occ) = maps.tenant_id_to_occ.get(integration_id) {
        return occ.clone();
    }
    if let Some(occ) = maps.integration_id_to_occ.get(integration_id) {
        return occ.clone();
    }
    if !v2_unit_id.is_empty() {
        if let Some(occ) = maps.unit_id_to_occ.get(v2_unit_id) {
            return occ.clone();
        }
    }
    String::new()
}

fn is_month_of(ymd: &str, today: NaiveDate) -> bool {
    if ymd.len() < 7 {
        return false;
    }
    let year = ymd[0..4].parse::<i32>();
    let month = ymd[5..7].parse::<u32>();
    matches!((year, month), (Ok(y), Ok(m)) if y == today.year() && m == today.month())
}

/// Transform delinquency rows into charge rows: resolve identities,
/// compute fees, normalize dates, and drop rows whose charge date is
/// outside the current calendar month.
pub fn build_charge_rows(
    delinquencies: &[DelinquencyRow],
    maps: &OccupancyMaps,
    ctx: &BuildContext,
) -> Vec<ChargeRow> {
    let today_iso = ctx.today.format("%Y-%m-%d").to_string();
    let mut rows = Vec::new();

    for r in delinquencies {
        let occ_v2 = r.occupancy_id.trim();

        // Resolve the occupancy UID. The row's own occupancy ID is
        // sometimes already the UID; otherwise fall back through the
        // composite key and the ID cross-reference.
        let occ_uid = if maps.occ_uid_to_candidates.contains_key(occ_v2) {
            occ_v2.to_string()
        } else {
            maps.occ_uid_by_prop_unit
                .get(&prop_unit_key(&r.property_name, &r.unit_name))
                .or_else(|| maps.occ_id_to_occ_uid.get(occ_v2))
                .cloned()
                .unwrap_or_default()
        };

        let integration_id = maps
            .occ_uid_to_candidates
            .get(&occ_uid)
            .map(|c| pick_integration_id(c))
            .unwrap_or_default();

        let v0_occupancy_id = resolve_v0_occupancy(&maps.v0, &integration_id, r.v2_unit_id.trim());

        let zero_to_30 = parse_currency(&r.zero_to_30_raw);
        let total_amount = parse_currency(&r.total_amount_raw);
        let params = ctx.schedule.params_for(&r.v2_property_id);
        let amount = compute_late_fee(total_amount, zero_to_30, &params).max(0.0);

        let charge_date_iso = {
            let parsed = to_ymd(&r.charge_date_raw);
            if parsed.is_empty() {
                today_iso.clone()
            } else {
                parsed
            }
        };
        let posting_date_iso = {
            let parsed = to_ymd(&r.posting_date_raw);
            if parsed.is_empty() {
                today_iso.clone()
            } else {
                parsed
            }
        };

        // Fees are charged for the current billing period only.
        if !is_month_of(&charge_date_iso, ctx.today) {
            continue;
        }

        rows.push(ChargeRow {
            property_name: r.property_name.clone(),
            unit_name: r.unit_name.clone(),
            occupancy_uid: occ_uid,
            tenant_name: last_comma_first_to_first_last(&r.payer_name),
            occupancy_id: occ_v2.to_string(),
            amount: round_cents(amount),
            charge_date: r.charge_date_raw.trim().to_string(),
            posting_date: r.posting_date_raw.trim().to_string(),
            gl_account_number: ctx.gl_account_number.clone(),
            description: late_fee_description(&charge_date_iso, &ctx.description_prefix, ctx.today),
            charge_date_iso,
            posting_date_iso,
            tenant_integration_id: integration_id,
            v0_occupancy_id,
            v2_unit_id: r.v2_unit_id.clone(),
            v2_property_id: r.v2_property_id.clone(),
            zero_to_30,
            total_amount,
        });
    }

    rows
}

/// Second resolution pass over still-unresolved rows, using a broader
/// transactional tenant dataset.
///
/// Only the transactional-side indexes are rebuilt; UID and candidate
/// selection from the first pass stand. Rows that already resolved are
/// returned untouched — a successful resolution is never overwritten
/// by a later pass.
pub fn retry_mapping_with_wide_tenants(
    rows: Vec<ChargeRow>,
    wide_tenants: &[V0Tenant],
) -> Vec<ChargeRow> {
    let maps = build_v0_maps(wide_tenants);

    rows.into_iter()
        .map(|row| {
            if !row.v0_occupancy_id.is_empty() {
                return row;
            }
            let resolved = resolve_v0_occupancy(
                &maps,
                row.tenant_integration_id.trim(),
                row.v2_unit_id.trim(),
            );
            ChargeRow {
                v0_occupancy_id: resolved,
                ..row
            }
        })
        .collect()
}
