//! # Canonical Data Model
//!
//! The entities that flow through the pipeline, plus the lenient
//! deserialization helpers used where the external APIs emit a field
//! as number-or-string-or-null. Both external systems describe the
//! same physical tenancies with different identifiers; the comments on
//! each struct say which system owns which field.

use serde::{Deserialize, Serialize};

/// One tenant-balance record from the reporting API's aged-receivables
/// query. Produced once per run, never mutated. Currency and date
/// fields are kept raw here; normalization happens when charge rows
/// are built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelinquencyRow {
    /// Property display name.
    pub property_name: String,
    /// Unit display name.
    pub unit_name: String,
    /// Payer display name in `"Last, First"` form.
    pub payer_name: String,
    /// Reporting-system occupancy identifier.
    pub occupancy_id: String,
    /// Current (0–30 day) aging bucket, raw.
    pub zero_to_30_raw: String,
    /// Total outstanding balance, raw.
    pub total_amount_raw: String,
    /// Reporting-system unit identifier.
    pub v2_unit_id: String,
    /// Reporting-system property identifier.
    pub v2_property_id: String,
    /// Posting date, raw.
    pub posting_date_raw: String,
    /// Charge/invoice date, raw.
    pub charge_date_raw: String,
}

/// One row of the reporting API's tenant directory. Many entries may
/// share an `occupancy_import_uid` — multiple tenants per occupancy —
/// so entries are resolution candidates, not unique records.
///
/// The directory is queried with several column sets (older report
/// versions name the unit column differently), hence the paired
/// `property`/`property_name` and `unit`/`unit_name` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenantDirectoryEntry {
    /// Stable cross-reference key for the occupancy.
    #[serde(deserialize_with = "de::lenient_string")]
    pub occupancy_import_uid: String,
    /// Shared key with the transactional system.
    #[serde(deserialize_with = "de::lenient_string")]
    pub tenant_integration_id: String,
    /// Free-text lifecycle status, matched case-insensitively.
    #[serde(deserialize_with = "de::lenient_string")]
    pub status: String,
    #[serde(deserialize_with = "de::lenient_string")]
    pub property_name: String,
    #[serde(deserialize_with = "de::lenient_string")]
    pub property: String,
    #[serde(deserialize_with = "de::lenient_string")]
    pub unit: String,
    #[serde(deserialize_with = "de::lenient_string")]
    pub unit_name: String,
    /// Reporting-system occupancy ID (distinct from the import UID).
    #[serde(deserialize_with = "de::lenient_string")]
    pub occupancy_id: String,
}

/// One tenant record from the transactional API. Its `occupancy_id`
/// is the ultimate target of identity resolution — the key the bulk
/// charge submission is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct V0Tenant {
    /// Transactional-system internal tenant ID.
    #[serde(deserialize_with = "de::lenient_string")]
    pub id: String,
    /// Shared key with the reporting system's directory.
    #[serde(deserialize_with = "de::lenient_string")]
    pub integration_id: String,
    /// Fallback for `integration_id` on older records.
    #[serde(deserialize_with = "de::lenient_string")]
    pub external_id: String,
    /// Transactional-system occupancy identifier.
    #[serde(deserialize_with = "de::lenient_string")]
    pub occupancy_id: String,
    /// Lifecycle status, matched case-insensitively.
    #[serde(deserialize_with = "de::lenient_string")]
    pub status: String,
    /// Transactional-system unit identifier.
    #[serde(deserialize_with = "de::lenient_string")]
    pub unit_id: String,
}

/// A fully built charge row: one surviving delinquency row with its
/// resolved identities, normalized dates, and computed fee.
///
/// Rows are value objects — the widen-retry pass replaces a row rather
/// than mutating it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRow {
    pub property_name: String,
    pub unit_name: String,
    /// Resolved reporting-system occupancy import UID (may be empty).
    pub occupancy_uid: String,
    /// Tenant display name, reordered to `"First Last"`.
    pub tenant_name: String,
    /// The delinquency row's own reporting-system occupancy ID.
    pub occupancy_id: String,
    /// Computed late fee, ≥ 0, rounded to cents.
    pub amount: f64,
    /// Charge date as received.
    pub charge_date: String,
    /// Posting date as received.
    pub posting_date: String,
    pub gl_account_number: String,
    /// Generated description, pinned to the first of the charge month.
    pub description: String,
    /// Normalized `YYYY-MM-DD` charge date.
    pub charge_date_iso: String,
    /// Normalized `YYYY-MM-DD` posting date.
    pub posting_date_iso: String,
    /// Integration ID selected during reconciliation (may be empty).
    pub tenant_integration_id: String,
    /// Resolved transactional-system occupancy ID; empty means the
    /// row is unresolved and excluded from submission.
    pub v0_occupancy_id: String,
    pub v2_unit_id: String,
    pub v2_property_id: String,
    /// Parsed current-bucket balance.
    pub zero_to_30: f64,
    /// Parsed total balance.
    pub total_amount: f64,
}

impl ChargeRow {
    /// Natural identity for selection and duplicate bookkeeping:
    /// `property|unit|tenant|v2_property_id`.
    pub fn row_id(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.property_name, self.unit_name, self.tenant_name, self.v2_property_id
        )
    }

    /// A row is submittable iff it resolved to a transactional
    /// occupancy and carries a positive fee.
    pub fn is_submittable(&self) -> bool {
        !self.v0_occupancy_id.is_empty() && self.amount > 0.0
    }
}

/// One item of the transactional API's bulk charge-creation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BulkChargeItem {
    /// Fee amount as a 2-decimal string.
    pub amount_due: String,
    /// ISO charge date.
    pub charged_on: String,
    pub description: String,
    pub gl_account_id: String,
    pub occupancy_id: String,
    /// Fresh UUID per item. Submission is not idempotent across
    /// retried runs; the reference only identifies items within one
    /// payload.
    pub reference_id: String,
}

/// Lenient serde helpers for fields the external APIs emit as string,
/// number, or null.
pub mod de {
    use serde::{Deserialize, Deserializer};

    /// Deserialize string-or-number-or-null into a trimmed `String`
    /// (null and absent become `""`).
    pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
        })
    }
}
