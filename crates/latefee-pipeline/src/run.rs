//! # Pipeline Orchestration
//!
//! One run walks a fixed phase sequence:
//!
//! ```text
//! fetch delinquencies → (empty? done)
//!   → fetch tenant data (parallel, degrade-on-failure)
//!   → build charge rows → (partial misses? widen retry)
//!   → classify valid → (dry-run? done) → submit
//! ```
//!
//! A failed tenant-data branch becomes a warning plus an empty
//! dataset; a failed delinquency fetch or submission ends the run with
//! `status: error`. In every case the caller gets a
//! [`PipelineResult`], never an error.

use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use latefee_client::EnvMode;
use latefee_core::fee::{round_cents, LateFeeSchedule};
use latefee_core::model::{BulkChargeItem, ChargeRow};
use latefee_core::reconcile::{
    build_charge_rows, build_occupancy_maps, retry_mapping_with_wide_tenants, BuildContext,
};

use crate::result::{PipelineResult, PipelineStatus};
use crate::source::ChargeSource;

/// Per-run pipeline settings, resolved from configuration before the
/// run starts.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mode: EnvMode,
    /// GL account number displayed on built rows.
    pub gl_account_number: String,
    /// GL account the bulk submission posts to.
    pub bulk_gl_account_id: String,
    /// Prefix for generated charge descriptions.
    pub description_prefix: String,
    /// Jurisdiction schedule for fee parameters.
    pub schedule: LateFeeSchedule,
}

/// Run the pipeline once.
///
/// `auto_submit` false is a dry run: everything up to classification
/// executes, nothing is submitted. This function never panics and
/// never returns an error — every outcome is a [`PipelineResult`].
pub async fn run_pipeline<S: ChargeSource>(
    source: &S,
    config: &PipelineConfig,
    auto_submit: bool,
) -> PipelineResult {
    let start = Instant::now();
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut warnings = Vec::new();

    match run_phases(source, config, auto_submit, &start, &timestamp, &mut warnings).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("pipeline run failed: {e:#}");
            PipelineResult {
                status: PipelineStatus::Error,
                total_rows: 0,
                valid_rows: 0,
                submitted_rows: 0,
                skipped_rows: 0,
                missing_v0_count: 0,
                total_amount: 0.0,
                duration: start.elapsed().as_millis() as u64,
                warnings,
                error: Some(format!("{e:#}")),
                mode: config.mode,
                timestamp,
            }
        }
    }
}

async fn run_phases<S: ChargeSource>(
    source: &S,
    config: &PipelineConfig,
    auto_submit: bool,
    start: &Instant,
    timestamp: &str,
    warnings: &mut Vec<String>,
) -> anyhow::Result<PipelineResult> {
    // Phase 1: delinquency rows. A failure here is fatal to the run.
    let delinquencies = source.fetch_delinquencies().await?;
    tracing::info!(rows = delinquencies.len(), "fetched delinquency rows");

    if delinquencies.is_empty() {
        return Ok(PipelineResult {
            status: if auto_submit {
                PipelineStatus::Success
            } else {
                PipelineStatus::DryRun
            },
            total_rows: 0,
            valid_rows: 0,
            submitted_rows: 0,
            skipped_rows: 0,
            missing_v0_count: 0,
            total_amount: 0.0,
            duration: start.elapsed().as_millis() as u64,
            warnings: vec!["No aged receivables found".to_string()],
            error: None,
            mode: config.mode,
            timestamp: timestamp.to_string(),
        });
    }

    // Phase 2: both tenant datasets in parallel. Either branch may
    // fail independently; the run proceeds on an empty dataset with
    // degraded resolution.
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

    // Phase 3: reconcile and build charge rows for the current month.
    let maps = build_occupancy_maps(&v0_tenants, &directory);
    let ctx = BuildContext {
        gl_account_number: config.gl_account_number.clone(),
        description_prefix: config.description_prefix.clone(),
        schedule: config.schedule.clone(),
        today: Utc::now().date_naive(),
    };
    let mut rows = build_charge_rows(&delinquencies, &maps, &ctx);
    tracing::info!(rows = rows.len(), "built charge rows");

    // Phase 4: widen retry, only when the first pass resolved some
    // rows but not all of them.
    let missing = rows.iter().filter(|r| r.v0_occupancy_id.is_empty()).count();
    if missing > 0 && missing < rows.len() {
        tracing::info!(missing, "retrying resolution with widened tenant lookback");
        match source.fetch_v0_tenants(true).await {
            Ok(wide) => rows = retry_mapping_with_wide_tenants(rows, &wide),
            Err(e) => {
                tracing::warn!("wide tenant retry failed: {e:#}");
                warnings.push("Wide tenant retry failed".to_string());
            }
        }
    }

    // Phase 5: classify.
    let valid: Vec<&ChargeRow> = rows.iter().filter(|r| r.is_submittable()).collect();
    let final_missing = rows.iter().filter(|r| r.v0_occupancy_id.is_empty()).count();
    let total_amount = round_cents(valid.iter().map(|r| r.amount).sum());
    if final_missing > 0 {
        warnings.push(format!("{final_missing} rows missing V0 occupancy ID"));
    }

    // Phase 6: dry-run stops here.
    if !auto_submit {
        return Ok(PipelineResult {
            status: PipelineStatus::DryRun,
            total_rows: rows.len(),
            valid_rows: valid.len(),
            submitted_rows: 0,
            skipped_rows: rows.len() - valid.len(),
            missing_v0_count: final_missing,
            total_amount,
            duration: start.elapsed().as_millis() as u64,
            warnings: std::mem::take(warnings),
            error: None,
            mode: config.mode,
            timestamp: timestamp.to_string(),
        });
    }

    if valid.is_empty() {
        let mut warnings = std::mem::take(warnings);
        warnings.push("No valid rows to submit".to_string());
        return Ok(PipelineResult {
            status: PipelineStatus::Success,
            total_rows: rows.len(),
            valid_rows: 0,
            submitted_rows: 0,
            skipped_rows: rows.len(),
            missing_v0_count: final_missing,
            total_amount: 0.0,
            duration: start.elapsed().as_millis() as u64,
            warnings,
            error: None,
            mode: config.mode,
            timestamp: timestamp.to_string(),
        });
    }

    // Phase 7: submit. The payload filter re-checks submittability as
    // defense in depth against upstream drift; a failure here is
    // fatal to the run.
    let items = build_payload(&rows, &config.bulk_gl_account_id, &ctx);
    let submitted = source.submit_bulk(items).await?;
    tracing::info!(submitted, "bulk submission complete");

    Ok(PipelineResult {
        status: PipelineStatus::Success,
        total_rows: rows.len(),
        valid_rows: valid.len(),
        submitted_rows: submitted,
        skipped_rows: rows.len() - valid.len(),
        missing_v0_count: final_missing,
        total_amount,
        duration: start.elapsed().as_millis() as u64,
        warnings: std::mem::take(warnings),
        error: None,
        mode: config.mode,
        timestamp: timestamp.to_string(),
    })
}

/// Build the bulk payload from submittable rows only, one fresh
/// reference ID per item.
fn build_payload(rows: &[ChargeRow], gl_account_id: &str, ctx: &BuildContext) -> Vec<BulkChargeItem> {
    let today = ctx.today.format("%Y-%m-%d").to_string();
    rows.iter()
        .filter(|r| r.is_submittable())
        .map(|r| BulkChargeItem {
            amount_due: format!("{:.2}", r.amount),
            charged_on: if r.charge_date_iso.is_empty() {
                today.clone()
            } else {
                r.charge_date_iso.clone()
            },
            description: r.description.clone(),
            gl_account_id: gl_account_id.to_string(),
            occupancy_id: r.v0_occupancy_id.clone(),
            reference_id: Uuid::new_v4().to_string(),
        })
        .collect()
}
