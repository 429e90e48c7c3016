//! CLI argument parsing for the scenario dispatcher.
//!
//! Flags must come before the scenario name; everything after it is handed
//! to the scenario untouched.
use clap::Parser;
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "skywalker",
    version,
    about = "Skywalker Recon CLI - Unified tool for security reconnaissance.",
    after_help = "Modes:\n  skywalker                          Pick a scenario and its arguments interactively\n  skywalker <scenario> [args...]     Run a scenario with the given arguments\n\nExamples:\n  skywalker\n  skywalker logicapps -json -loglevel verbose\n  skywalker --surface keyvaults\n  skywalker --registry ./registry.json --list"
)]
pub struct RootArgs {
    /// Registry file mapping scenario names to programs
    #[arg(long, value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// List registered scenarios and exit
    #[arg(long, conflicts_with_all = ["scenario", "surface"])]
    pub list: bool,

    /// Print the scenario's discovered argument surface as JSON and exit
    #[arg(long, requires = "scenario")]
    pub surface: bool,

    /// Emit debug logging to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Scenario to run; omit it for the interactive menu
    #[arg(value_name = "SCENARIO")]
    pub scenario: Option<String>,

    /// Arguments passed through to the scenario unchanged
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
