//! # latefee-cli — Late-Fee Pipeline CLI
//!
//! Provides the `latefee` command-line interface over the pipeline
//! crates, the same surface the cron scheduler invokes.
//!
//! ## Subcommands
//!
//! - `latefee run` — Run the pipeline; dry-run unless `--submit`.
//! - `latefee preview` — Build the full charge table with duplicate
//!   annotations, never submitting.
//! - `latefee check-config` — Validate the environment offline.

pub mod check_config;
pub mod preview;
pub mod run;

use anyhow::{Context, Result};

use latefee_client::config::{description_prefix, schedule_from_env, GlConfig};
use latefee_client::{EnvMode, V0Client, V0Config, V2Client, V2Config};
use latefee_pipeline::{HttpChargeSource, PipelineConfig};

/// Load the environment for `mode` and assemble the production charge
/// source plus the matching pipeline settings.
pub fn load_pipeline(mode: EnvMode) -> Result<(HttpChargeSource, PipelineConfig)> {
    let v2_config = V2Config::from_env(mode).context("loading reporting-API configuration")?;
    let v0_config = V0Config::from_env(mode).context("loading transactional-API configuration")?;
    let gl = GlConfig::from_env(mode);

    let v2 = V2Client::new(v2_config).context("building reporting-API client")?;
    let v0 = V0Client::new(v0_config).context("building transactional-API client")?;

    let source = HttpChargeSource::new(v2, v0, gl.filter_gl_account.clone());
    let config = PipelineConfig {
        mode,
        gl_account_number: gl.table_gl_account_number,
        bulk_gl_account_id: gl.bulk_gl_account_id,
        description_prefix: description_prefix(mode),
        schedule: schedule_from_env(mode),
    };

    Ok((source, config))
}
