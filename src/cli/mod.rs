// CLI module
// Command-line interface and argument parsing for the demo driver

mod args;

pub use args::{CliArgs, StrategyType};

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, a negative amount, or `--help`), clap
/// prints an error or the help text and exits the process.
///
/// # Returns
///
/// Returns a `CliArgs` struct with the parsed command-line arguments. Turn it
/// into a run configuration with `CliArgs::to_demo_config`.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
