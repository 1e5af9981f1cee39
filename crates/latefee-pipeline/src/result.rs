//! Structured pipeline outcomes, serialized for the scheduler and CLI.

use serde::{Deserialize, Serialize};

use latefee_client::EnvMode;

/// Terminal status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStatus {
    /// The run completed; charges may or may not have been submitted.
    Success,
    /// The run failed on the primary fetch or on submission.
    Error,
    /// The run completed without submitting (preview).
    DryRun,
}

/// Structured result of one pipeline run. The orchestrator's public
/// contract: this is always returned, never an error or a panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub status: PipelineStatus,
    /// Charge rows built for the current billing period.
    pub total_rows: usize,
    /// Rows with a resolved occupancy and a positive fee.
    pub valid_rows: usize,
    /// Rows actually submitted.
    pub submitted_rows: usize,
    /// Rows held back (unresolved, zero fee, or dry-run).
    pub skipped_rows: usize,
    /// Rows still unresolved after the widen-retry pass.
    pub missing_v0_count: usize,
    /// Sum of valid-row fees, rounded to cents.
    pub total_amount: f64,
    /// Wall-clock duration of the run, in milliseconds.
    pub duration: u64,
    /// Human-readable degradations encountered along the way.
    pub warnings: Vec<String>,
    /// Fatal error message when `status` is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub mode: EnvMode,
    /// RFC 3339 start time of the run.
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_with_scheduler_field_names() {
        let result = PipelineResult {
            status: PipelineStatus::DryRun,
            total_rows: 4,
            valid_rows: 3,
            submitted_rows: 0,
            skipped_rows: 1,
            missing_v0_count: 1,
            total_amount: 75.5,
            duration: 1200,
            warnings: vec!["1 rows missing V0 occupancy ID".into()],
            error: None,
            mode: EnvMode::Test,
            timestamp: "2025-08-30T12:00:00Z".into(),
        };
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["status"], "dry-run");
        assert_eq!(v["missingV0Count"], 1);
        assert_eq!(v["totalRows"], 4);
        assert_eq!(v["mode"], "test");
        // `error` is omitted entirely when absent.
        assert!(v.get("error").is_none());
    }
}
