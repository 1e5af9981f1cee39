//! # Preview Subcommand
//!
//! Builds the charge table for review without submitting anything:
//! every row, duplicate-group annotations, and the submittable total.

use anyhow::Result;
use clap::Args;

use latefee_client::EnvMode;
use latefee_pipeline::run_preview;

use crate::load_pipeline;

/// Arguments for the `latefee preview` subcommand.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Credential set to run against.
    #[arg(long, default_value = "test")]
    pub mode: EnvMode,
}

pub async fn run_preview_cmd(args: &PreviewArgs) -> Result<u8> {
    let (source, config) = load_pipeline(args.mode)?;
    let report = run_preview(&source, &config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}
