//! # Check-Config Subcommand
//!
//! Offline validation of the environment for a given mode: reports
//! which required variables are missing and how the optional knobs
//! resolved, without opening a single connection. Intended for the
//! scheduler deploy pipeline.

use anyhow::Result;
use clap::Args;

use latefee_client::config::{description_prefix, is_dry_run, GlConfig};
use latefee_client::{EnvMode, V0Config, V2Config};

/// Arguments for the `latefee check-config` subcommand.
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// Credential set to validate.
    #[arg(long, default_value = "test")]
    pub mode: EnvMode,
}

pub fn run_check_config(args: &CheckConfigArgs) -> Result<u8> {
    let mode = args.mode;
    let mut errors = Vec::new();

    let v2_property_ids = match V2Config::from_env(mode) {
        Ok(cfg) => cfg.property_ids.len(),
        Err(e) => {
            errors.push(e.to_string());
            0
        }
    };
    let v0_property_ids = match V0Config::from_env(mode) {
        Ok(cfg) => cfg.property_ids.len(),
        Err(e) => {
            errors.push(e.to_string());
            0
        }
    };
    let gl = GlConfig::from_env(mode);

    let ok = errors.is_empty();
    let report = serde_json::json!({
        "mode": mode,
        "ok": ok,
        "errors": errors,
        "v2PropertyIds": v2_property_ids,
        "v0PropertyIds": v0_property_ids,
        "bulkGlAccountConfigured": !gl.bulk_gl_account_id.is_empty(),
        "glAccountFilter": gl.filter_gl_account,
        "descriptionPrefix": description_prefix(mode),
        "dryRunLatch": is_dry_run(mode),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if ok { 0 } else { 1 })
}
