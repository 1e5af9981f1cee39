//! # Run Subcommand
//!
//! One full pipeline invocation, printed as the structured result the
//! scheduler consumes. Dry-run unless `--submit`; in test mode the
//! `TEST_DRY_RUN=1` latch forces dry-run even when submission was
//! requested.

use anyhow::Result;
use clap::Args;

use latefee_client::config::is_dry_run;
use latefee_client::EnvMode;
use latefee_pipeline::{run_pipeline, PipelineStatus};

use crate::load_pipeline;

/// Arguments for the `latefee run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Credential set to run against.
    #[arg(long, default_value = "test")]
    pub mode: EnvMode,

    /// Submit the charges. Without this flag the run is a dry run.
    #[arg(long)]
    pub submit: bool,
}

pub async fn run_run(args: &RunArgs) -> Result<u8> {
    let (source, config) = load_pipeline(args.mode)?;

    let mut auto_submit = args.submit;
    if auto_submit && is_dry_run(args.mode) {
        tracing::warn!("TEST_DRY_RUN is set; forcing dry run despite --submit");
        auto_submit = false;
    }

    let result = run_pipeline(&source, &config, auto_submit).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(if result.status == PipelineStatus::Error {
        1
    } else {
        0
    })
}
