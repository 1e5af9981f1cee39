//! # Environment Configuration
//!
//! Credentials, endpoints, and tuning knobs come from environment
//! variables. Every variable has a `TEST_`-prefixed twin selected by
//! [`EnvMode::Test`], so a test portfolio can run side by side with
//! the live one.
//!
//! Missing credentials are a hard [`ConfigError`] at load time;
//! optional knobs (GL filter, description prefix, property groups)
//! default benignly.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use latefee_core::fee::{LateFeeParams, LateFeeSchedule, GROUP_A_PARAMS};

/// Which credential set a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvMode {
    /// Production portfolio and credentials.
    Live,
    /// Test portfolio (`TEST_*` variables).
    Test,
}

impl EnvMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Live => "",
            Self::Test => "TEST_",
        }
    }
}

impl std::fmt::Display for EnvMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnvMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::InvalidMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("missing required environment variable {name}")]
    MissingVar { name: String },
    /// An unrecognized environment mode string.
    #[error("invalid environment mode {value:?} (expected \"live\" or \"test\")")]
    InvalidMode { value: String },
}

/// Reporting-API (V2) connection settings.
#[derive(Debug, Clone)]
pub struct V2Config {
    /// Base URL, no trailing slash.
    pub base: String,
    pub user: String,
    pub pass: String,
    /// Property IDs scoping every query.
    pub property_ids: Vec<String>,
}

impl V2Config {
    pub fn from_env(mode: EnvMode) -> Result<Self, ConfigError> {
        Ok(Self {
            base: required(mode, "V2_BASE")?.trim_end_matches('/').to_string(),
            user: required(mode, "V2_USER")?,
            pass: required(mode, "V2_PASS")?,
            property_ids: id_list(optional(mode, "V2_PROPERTY_IDS")),
        })
    }
}

/// Transactional-API (V0) connection settings.
#[derive(Debug, Clone)]
pub struct V0Config {
    /// Base URL, no trailing slash.
    pub base: String,
    /// Developer ID sent on every request.
    pub dev_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Property IDs for the batched tenant queries.
    pub property_ids: Vec<String>,
}

/// Default transactional-API base when `V0_BASE` is unset.
const DEFAULT_V0_BASE: &str = "https://api.appfolio.com/api/v0";

impl V0Config {
    pub fn from_env(mode: EnvMode) -> Result<Self, ConfigError> {
        let base = optional(mode, "V0_BASE").unwrap_or_else(|| DEFAULT_V0_BASE.to_string());
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            dev_id: required(mode, "V0_DEV_ID")?,
            client_id: required(mode, "V0_CLIENT_ID")?,
            client_secret: required(mode, "V0_CLIENT_SECRET")?,
            property_ids: id_list(optional(mode, "V0_PROPERTY_IDS")),
        })
    }
}

/// GL account settings for filtering and submission.
#[derive(Debug, Clone)]
pub struct GlConfig {
    /// GL account the bulk-created charges post to.
    pub bulk_gl_account_id: String,
    /// GL account number shown on built rows.
    pub table_gl_account_number: String,
    /// When non-empty, aged-receivables rows are filtered to this
    /// account number.
    pub filter_gl_account: String,
}

impl GlConfig {
    pub fn from_env(mode: EnvMode) -> Self {
        Self {
            bulk_gl_account_id: optional(mode, "BULK_GL_ACCOUNT_ID").unwrap_or_default(),
            table_gl_account_number: optional(mode, "TABLE_GL_ACCOUNT_NUMBER")
                .unwrap_or_else(|| "4815-000".to_string()),
            filter_gl_account: optional(mode, "FILTER_GL_ACCOUNT").unwrap_or_default(),
        }
    }
}

/// Description prefix for generated charge descriptions.
pub fn description_prefix(mode: EnvMode) -> String {
    optional(mode, "LATE_FEE_DESCRIPTION_PREFIX")
        .unwrap_or_else(|| "IL Custom Late Fee".to_string())
}

/// Jurisdiction schedule: group membership from `PROPERTY_GROUP_A` /
/// `PROPERTY_GROUP_B` ID lists, fallback parameters from the
/// `DEFAULT_LATE_FEE_*` knobs.
pub fn schedule_from_env(mode: EnvMode) -> LateFeeSchedule {
    let group_a: HashSet<String> = id_list(optional(mode, "PROPERTY_GROUP_A"))
        .into_iter()
        .collect();
    let group_b: HashSet<String> = id_list(optional(mode, "PROPERTY_GROUP_B"))
        .into_iter()
        .collect();
    let defaults = LateFeeParams {
        threshold: float_knob(mode, "DEFAULT_LATE_FEE_THRESHOLD", GROUP_A_PARAMS.threshold),
        percent: float_knob(mode, "DEFAULT_LATE_FEE_PERCENT", GROUP_A_PARAMS.percent),
        base: float_knob(mode, "DEFAULT_LATE_FEE_BASE", GROUP_A_PARAMS.base),
    };
    LateFeeSchedule::new(group_a, group_b, defaults)
}

/// Test-mode safety latch: with `TEST_DRY_RUN=1`, submission is forced
/// into dry-run even when explicitly requested. Live mode ignores it.
pub fn is_dry_run(mode: EnvMode) -> bool {
    mode == EnvMode::Test && optional(mode, "DRY_RUN").as_deref() == Some("1")
}

fn optional(mode: EnvMode, name: &str) -> Option<String> {
    let full = format!("{}{}", mode.prefix(), name);
    std::env::var(full)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(mode: EnvMode, name: &str) -> Result<String, ConfigError> {
    optional(mode, name).ok_or_else(|| ConfigError::MissingVar {
        name: format!("{}{}", mode.prefix(), name),
    })
}

fn id_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn float_knob(mode: EnvMode, name: &str, default: f64) -> f64 {
    optional(mode, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parsing() {
        assert_eq!("live".parse::<EnvMode>().unwrap(), EnvMode::Live);
        assert_eq!(" TEST ".parse::<EnvMode>().unwrap(), EnvMode::Test);
        assert!("staging".parse::<EnvMode>().is_err());
    }

    #[test]
    fn id_list_splits_and_trims() {
        assert_eq!(
            id_list(Some("a, b ,,c".into())),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(id_list(None).is_empty());
    }

    // Environment-variable reads are covered in one place to avoid
    // cross-test races on the process environment.
    #[test]
    fn test_mode_reads_prefixed_vars() {
        std::env::set_var("TEST_V2_BASE", "https://reports.example/api/");
        std::env::set_var("TEST_V2_USER", "u");
        std::env::set_var("TEST_V2_PASS", "p");
        std::env::set_var("TEST_V2_PROPERTY_IDS", "11,22");
        std::env::set_var("TEST_DRY_RUN", "1");

        let cfg = V2Config::from_env(EnvMode::Test).unwrap();
        assert_eq!(cfg.base, "https://reports.example/api");
        assert_eq!(cfg.property_ids, vec!["11", "22"]);
        assert!(is_dry_run(EnvMode::Test));
        assert!(!is_dry_run(EnvMode::Live));

        // Missing live credentials fail fast.
        std::env::remove_var("V2_BASE");
        assert!(matches!(
            V2Config::from_env(EnvMode::Live),
            Err(ConfigError::MissingVar { .. })
        ));
    }
}
