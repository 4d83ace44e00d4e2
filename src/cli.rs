//! CLI argument parsing via `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mendyard::types::Priority;

#[derive(Parser, Debug)]
#[command(
    name = "mendyard",
    version,
    about = "Conservative, reversible batch remediation of flake8 violations",
    long_about = "Mendyard groups static-analysis violations per file, snapshots each file, applies safe fixes on a bounded worker pool, and rolls back any batch that fails.\n\nConfiguration precedence: CLI > mendyard.toml > defaults.",
    after_help = "Examples:\n  flake8 . > violations.txt && mendyard run --violations violations.txt\n  mendyard plan --violations v.json --format json --output json\n  mendyard rollback --run run_20250101T120000_deadbeef",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remediate violations and report outcomes
    #[command(
        about = "Run remediation",
        after_help = "Exit codes: 0 ok, 1 nothing fixed and something failed, 2 input/config error, 30 lock timeout, 70 restore failed"
    )]
    Run {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, help = "Dispatch at most N batches")]
        max_batches: Option<usize>,
        #[arg(long, help = "Only dispatch batches of this priority (CRITICAL|HIGH|MEDIUM|LOW)")]
        priority: Option<Priority>,
        #[arg(long, help = "Worker pool size (overrides mendyard.toml)")]
        workers: Option<usize>,
        #[arg(long, help = "Append per-violation outcomes as JSON lines to FILE")]
        outcomes: Option<PathBuf>,
        #[arg(long, help = "Append structured facts as JSON lines to FILE")]
        facts: Option<PathBuf>,
    },
    /// Print the prioritized batches without touching any file
    #[command(about = "Show the batch plan")]
    Plan {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Restore every file a previous run touched
    #[command(about = "Roll back a run")]
    Rollback {
        #[arg(long = "run", help = "Run id printed by `mendyard run`")]
        run_id: String,
        #[arg(long, help = "Workspace root (default: current dir)")]
        root: Option<PathBuf>,
        #[arg(long, help = "Path to mendyard.toml (default: <root>/mendyard.toml)")]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputMode::Human)]
        output: OutputMode,
    },
}

/// Inputs shared by `run` and `plan`.
#[derive(Args, Debug)]
pub struct InputArgs {
    #[arg(long, help = "Violation report produced by the linter")]
    pub violations: PathBuf,
    #[arg(long, value_enum, default_value_t = InputFormat::Flake8)]
    pub format: InputFormat,
    #[arg(long, help = "Workspace root (default: current dir)")]
    pub root: Option<PathBuf>,
    #[arg(long, help = "Path to mendyard.toml (default: <root>/mendyard.toml)")]
    pub config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputMode::Human)]
    pub output: OutputMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Flake8,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Human,
    Json,
}
