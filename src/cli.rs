// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dagrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagrun",
    version,
    about = "Run a DAG of shell tasks with dependency-aware scheduling.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Dagrun.toml")]
    pub config: String,

    /// Stop the campaign on the first task failure (overrides the config).
    #[arg(long)]
    pub quit_on_failure: bool,

    /// Maximum number of concurrently running tasks; 0 means unbounded
    /// (overrides the config).
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the DAG, but don't execute any commands.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
