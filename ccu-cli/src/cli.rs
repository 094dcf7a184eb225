use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "ccu",
    about = "Solve congruence-closure unification problems over finite domains",
    version,
    after_help = "\
Typical workflow:
  ccu check problem.json
  ccu solve problem.json --strategy lazy
  ccu core problem.json

Piping (use - to read from stdin):
  cat problem.json | ccu solve -

Enable tab completion:
  eval \"$(ccu completions)\"     # add to ~/.bashrc or ~/.zshrc"
)]
pub struct Cli {
    /// Output file path (implies JSON output)
    #[arg(long, short, global = true)]
    pub output: Option<PathBuf>,

    /// Suppress informational messages on stderr
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which solver strategy drives a run, mirroring `ccu::Strategy`.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StrategyArg {
    Lazy,
    Table,
}

impl From<StrategyArg> for ccu::Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Lazy => ccu::Strategy::Lazy,
            StrategyArg::Table => ccu::Strategy::Table,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decide satisfiability of a problem document
    #[command(after_help = "\
Examples:
  ccu solve problem.json
  ccu solve problem.json --strategy table
  ccu solve problem.json --timeout-ms 5000")]
    Solve(SolveArgs),

    /// Solve an UNSAT problem and report a minimal contradictory sub-problem set
    #[command(after_help = "\
Examples:
  ccu core problem.json
  ccu core problem.json --strategy table")]
    Core(CoreArgs),

    /// Validate a problem document without solving it
    #[command(after_help = "\
Examples:
  ccu check problem.json")]
    Check(CheckArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [default: detected from $SHELL]
        shell: Option<clap_complete::Shell>,
    },
}

#[derive(Parser)]
pub struct SolveArgs {
    /// Path to a problem document, or - for stdin
    pub input: PathBuf,

    /// Which solver strategy to run
    #[arg(long, value_enum, default_value = "lazy")]
    pub strategy: StrategyArg,

    /// Abort the solve after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

#[derive(Parser)]
pub struct CoreArgs {
    /// Path to a problem document, or - for stdin
    pub input: PathBuf,

    /// Which solver strategy to run
    #[arg(long, value_enum, default_value = "lazy")]
    pub strategy: StrategyArg,

    /// Abort the solve (and any core extraction) after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to a problem document, or - for stdin
    pub input: PathBuf,
}
