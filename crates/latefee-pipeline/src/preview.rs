//! # Charge Preview
//!
//! The review path: build the full charge table without submitting
//! anything, annotated with duplicate-tenancy groups so a reviewer can
//! see which rows would be held back. Unlike [`crate::run_pipeline`],
//! this surfaces the rows themselves, not just counts.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use latefee_client::EnvMode;
use latefee_core::dedupe::compute_duplicates;
use latefee_core::fee::round_cents;
use latefee_core::model::ChargeRow;
use latefee_core::reconcile::{
    build_charge_rows, build_occupancy_maps, retry_mapping_with_wide_tenants, BuildContext,
};

use crate::run::PipelineConfig;
use crate::source::ChargeSource;

/// The charge table as a reviewer sees it before submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewReport {
    /// Every charge row built for the current billing period.
    pub rows: Vec<ChargeRow>,
    /// Row IDs that duplicate detection would hold back.
    pub duplicate_excluded_ids: Vec<String>,
    /// Row IDs belonging to any duplicate group, kept members included.
    pub duplicate_group_ids: Vec<String>,
    /// Rows still unresolved after the widen-retry pass.
    pub missing_v0_count: usize,
    /// Sum of submittable-row fees, rounded to cents.
    pub total_amount: f64,
    pub warnings: Vec<String>,
    pub mode: EnvMode,
    /// RFC 3339 build time of the preview.
    pub timestamp: String,
}

/// Build the charge table for review. Tenant-data failures degrade to
/// warnings exactly as in a live run; a failed delinquency fetch is
/// fatal.
pub async fn run_preview<S: ChargeSource>(
    source: &S,
    config: &PipelineConfig,
) -> anyhow::Result<PreviewReport> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut warnings = Vec::new();

    let delinquencies = source.fetch_delinquencies().await?;
    tracing::info!(rows = delinquencies.len(), "fetched delinquency rows");

    let (directory, v0_tenants) = tokio::join!(
        source.fetch_tenant_directory(),
        source.fetch_v0_tenants(false),
    );
    let directory = directory.unwrap_or_else(|e| {
        warnings.push(format!("Tenant directory: {e:#}"));
        Vec::new()
    });
    let v0_tenants = v0_tenants.unwrap_or_else(|e| {
        warnings.push(format!("V0 tenants: {e:#}"));
        Vec::new()
    });

    let maps = build_occupancy_maps(&v0_tenants, &directory);
    let ctx = BuildContext {
        gl_account_number: config.gl_account_number.clone(),
        description_prefix: config.description_prefix.clone(),
        schedule: config.schedule.clone(),
        today: Utc::now().date_naive(),
    };
    let mut rows = build_charge_rows(&delinquencies, &maps, &ctx);

    let missing = rows.iter().filter(|r| r.v0_occupancy_id.is_empty()).count();
    if missing > 0 && missing < rows.len() {
        match source.fetch_v0_tenants(true).await {
            Ok(wide) => rows = retry_mapping_with_wide_tenants(rows, &wide),
            Err(e) => {
                tracing::warn!("wide tenant retry failed: {e:#}");
                warnings.push("Wide tenant retry failed".to_string());
            }
        }
    }

    let duplicates = compute_duplicates(&rows);
    let mut duplicate_excluded_ids: Vec<String> = duplicates.excluded_ids.into_iter().collect();
    let mut duplicate_group_ids: Vec<String> = duplicates.group_ids.into_iter().collect();
    duplicate_excluded_ids.sort();
    duplicate_group_ids.sort();

    let missing_v0_count = rows.iter().filter(|r| r.v0_occupancy_id.is_empty()).count();
    let total_amount = round_cents(
        rows.iter()
            .filter(|r| r.is_submittable())
            .map(|r| r.amount)
            .sum(),
    );

    Ok(PreviewReport {
        rows,
        duplicate_excluded_ids,
        duplicate_group_ids,
        missing_v0_count,
        total_amount,
        warnings,
        mode: config.mode,
        timestamp,
    })
}
