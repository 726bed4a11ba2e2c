//! # regmap CLI entry point
//!
//! Parses command-line arguments, resolves configuration, and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use regmap_cli::build::{run_build, BuildArgs};
use regmap_cli::requirements::{run_features, run_match, FeaturesArgs, MatchArgs};
use regmap_cli::verify::{run_verify, VerifyArgs};
use regmap_cli::RegmapConfig;

/// regmap: regulatory document mapping and requirement matching.
///
/// Builds a paragraph tree and keyword feature mapping from a regulatory
/// document, then matches the mapped requirements against business profiles.
#[derive(Parser, Debug)]
#[command(name = "regmap", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Path to a YAML or JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build paragraph and mapping artifacts from a source document.
    Build(BuildArgs),

    /// Compare two artifact directories for structural equality.
    Verify(VerifyArgs),

    /// Match requirements against a business profile.
    #[command(name = "match")]
    Match(MatchArgs),

    /// List the features applicable to a business profile.
    Features(FeaturesArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    tracing::debug!("regmap CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match RegmapConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Build(args) => run_build(&args, &config),
        Commands::Verify(args) => run_verify(&args),
        Commands::Match(args) => run_match(&args, &config),
        Commands::Features(args) => run_features(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
