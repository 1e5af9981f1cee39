//! # Statutory Late-Fee Calculation
//!
//! The fee formula is a jurisdiction-specific legal rule, not a
//! heuristic: any deviation from it is a correctness bug. Two fixed
//! property groups carry distinct thresholds; properties in neither
//! group fall back to configured defaults.
//!
//! ## Formula
//!
//! Given the tenant's total outstanding balance and the current
//! (0–30 day) aging bucket:
//!
//! - current bucket ≤ ε → no fee (no recent delinquency means no fee
//!   regardless of total balance);
//! - total > threshold → `(total − threshold) × percent + base`;
//! - otherwise → `base`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Tolerance for float noise in the current-bucket balance. Balances
/// at or below this are treated as zero.
pub const ZERO_EPS: f64 = 1e-6;

/// Parameters of the late-fee formula for one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateFeeParams {
    /// Balance threshold above which the percentage component applies.
    pub threshold: f64,
    /// Percentage applied to the balance in excess of the threshold.
    pub percent: f64,
    /// Flat base fee charged whenever any fee is due.
    pub base: f64,
}

/// Group A jurisdiction parameters (county ordinance).
pub const GROUP_A_PARAMS: LateFeeParams = LateFeeParams {
    threshold: 1000.0,
    percent: 0.05,
    base: 10.0,
};

/// Group B jurisdiction parameters (municipal ordinance).
pub const GROUP_B_PARAMS: LateFeeParams = LateFeeParams {
    threshold: 500.0,
    percent: 0.05,
    base: 10.0,
};

/// Jurisdiction group a property belongs to, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyGroup {
    /// County-ordinance properties.
    GroupA,
    /// Municipal-ordinance properties.
    GroupB,
    /// Properties in neither configured group.
    Ungrouped,
}

impl std::fmt::Display for PropertyGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroupA => write!(f, "Group A"),
            Self::GroupB => write!(f, "Group B"),
            Self::Ungrouped => write!(f, "Ungrouped"),
        }
    }
}

/// Maps reporting-system property identifiers to late-fee parameters.
///
/// A property ID belongs to at most one group; membership is
/// configuration, the per-group parameters are fixed by ordinance.
#[derive(Debug, Clone, Default)]
pub struct LateFeeSchedule {
    group_a: HashSet<String>,
    group_b: HashSet<String>,
    defaults: Option<LateFeeParams>,
}

impl LateFeeSchedule {
    /// Build a schedule from the two group membership lists and the
    /// fallback parameters for ungrouped properties.
    pub fn new<I, J>(group_a: I, group_b: J, defaults: LateFeeParams) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        Self {
            group_a: group_a.into_iter().map(|s| s.trim().to_string()).collect(),
            group_b: group_b.into_iter().map(|s| s.trim().to_string()).collect(),
            defaults: Some(defaults),
        }
    }

    /// Which group a property ID falls in.
    pub fn group_for(&self, property_id: &str) -> PropertyGroup {
        let pid = property_id.trim();
        if self.group_a.contains(pid) {
            PropertyGroup::GroupA
        } else if self.group_b.contains(pid) {
            PropertyGroup::GroupB
        } else {
            PropertyGroup::Ungrouped
        }
    }

    /// Late-fee parameters for a property ID.
    pub fn params_for(&self, property_id: &str) -> LateFeeParams {
        match self.group_for(property_id) {
            PropertyGroup::GroupA => GROUP_A_PARAMS,
            PropertyGroup::GroupB => GROUP_B_PARAMS,
            PropertyGroup::Ungrouped => self.defaults.unwrap_or(GROUP_A_PARAMS),
        }
    }
}

/// Compute the statutory late fee.
///
/// Inputs are the already-normalized balance figures. The result can
/// be negative only on corrupted inputs (negative total, bad
/// threshold); callers clamp to ≥ 0 before use.
pub fn compute_late_fee(total: f64, zero_to_30: f64, params: &LateFeeParams) -> f64 {
    if zero_to_30 <= ZERO_EPS {
        return 0.0;
    }
    if total > params.threshold {
        return (total - params.threshold) * params.percent + params.base;
    }
    params.base
}

/// Round to two decimal places (cents).
pub fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
