//! Balance Guard demo CLI
//!
//! Runs one depositor and one withdrawer concurrently against a shared balance.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --strategy async --seed 42
//! cargo run -- --withdrawal 500 --initial-balance 0 --opening-deposit 500 --deposits 0
//! RUST_LOG=debug cargo run -- --max-delay-ms 200
//! ```
//!
//! The withdrawer asks for more than the starting balance and blocks until the
//! depositor's random deposits cover it. Once the depositor is done the
//! withdrawal is cancelled if it is still waiting.
//!
//! The run's report is written to stdout as CSV; logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success (the withdrawal settled, was cancelled, or timed out)
//! - 1: Error (invalid configuration, worker failure, output failure)

use balance_guard::cli;
use balance_guard::io::write_report;
use balance_guard::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let args = cli::parse_args();
    let config = args.to_demo_config();
    let strategy = strategy::create_strategy(args.strategy);

    let report = match strategy.run(&config) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "demo run failed");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if !report.is_consistent() {
        tracing::warn!(
            expected = %report.expected_balance(),
            actual = %report.final_balance,
            "final balance does not match recorded movements"
        );
    }

    let mut output = std::io::stdout();
    if let Err(e) = write_report(&report, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
