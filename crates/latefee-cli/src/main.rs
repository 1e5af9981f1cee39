//! # latefee CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand
//! handlers. Verbosity flags drive the tracing filter; every handler
//! returns an exit code so scheduler wrappers can branch on failure.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use latefee_cli::check_config::{run_check_config, CheckConfigArgs};
use latefee_cli::preview::{run_preview_cmd, PreviewArgs};
use latefee_cli::run::{run_run, RunArgs};

/// Late-fee charge pipeline
///
/// Computes statutory late fees from aged-receivables data, reconciles
/// tenant identities across the reporting and transactional APIs, and
/// submits the resulting charges in bulk.
#[derive(Parser, Debug)]
#[command(name = "latefee", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pipeline (dry run unless --submit).
    Run(RunArgs),

    /// Build the charge table for review; never submits.
    Preview(PreviewArgs),

    /// Validate the environment without touching the network.
    CheckConfig(CheckConfigArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run(args) => run_run(&args).await,
        Commands::Preview(args) => run_preview_cmd(&args).await,
        Commands::CheckConfig(args) => run_check_config(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latefee_client::EnvMode;

    #[test]
    fn cli_parse_run_defaults_to_test_dry_run() {
        let cli = Cli::try_parse_from(["latefee", "run"]).unwrap();
        if let Commands::Run(args) = cli.command {
            assert_eq!(args.mode, EnvMode::Test);
            assert!(!args.submit);
        } else {
            panic!("expected run subcommand");
        }
    }

    #[test]
    fn cli_parse_run_live_submit() {
        let cli = Cli::try_parse_from(["latefee", "run", "--mode", "live", "--submit"]).unwrap();
        if let Commands::Run(args) = cli.command {
            assert_eq!(args.mode, EnvMode::Live);
            assert!(args.submit);
        } else {
            panic!("expected run subcommand");
        }
    }

    #[test]
    fn cli_parse_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["latefee", "run", "--mode", "staging"]).is_err());
    }

    #[test]
    fn cli_parse_preview() {
        let cli = Cli::try_parse_from(["latefee", "preview", "--mode", "live"]).unwrap();
        assert!(matches!(cli.command, Commands::Preview(_)));
    }

    #[test]
    fn cli_parse_check_config() {
        let cli = Cli::try_parse_from(["latefee", "check-config"]).unwrap();
        assert!(matches!(cli.command, Commands::CheckConfig(_)));
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli = Cli::try_parse_from(["latefee", "-vv", "run"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["latefee"]).is_err());
    }
}
