use crate::strategy::DemoConfig;
use crate::types::parse_amount;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::time::Duration;

/// Run concurrent deposits and a blocking withdrawal against one shared balance
#[derive(Parser, Debug)]
#[command(name = "balance-guard")]
#[command(
    about = "Run concurrent deposits and a blocking withdrawal against one shared balance",
    long_about = None
)]
pub struct CliArgs {
    /// Concurrency strategy for the demo
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Concurrency strategy: 'sync' for OS threads or 'async' for tokio tasks"
    )]
    pub strategy: StrategyType,

    /// Starting balance
    #[arg(
        long = "initial-balance",
        value_name = "AMOUNT",
        default_value = "100000",
        value_parser = parse_amount_arg
    )]
    pub initial_balance: Decimal,

    /// Deposit made before the workers start
    #[arg(
        long = "opening-deposit",
        value_name = "AMOUNT",
        default_value = "3000",
        value_parser = parse_amount_arg
    )]
    pub opening_deposit: Decimal,

    /// Amount the withdrawer requests
    #[arg(
        long = "withdrawal",
        value_name = "AMOUNT",
        default_value = "105000",
        value_parser = parse_amount_arg
    )]
    pub withdrawal: Decimal,

    /// Number of random deposits
    #[arg(long = "deposits", value_name = "COUNT", default_value_t = 5)]
    pub deposits: usize,

    /// Exclusive upper bound of each random deposit
    #[arg(long = "max-deposit", value_name = "AMOUNT", default_value_t = 1_000)]
    pub max_deposit: u32,

    /// Exclusive upper bound of the pause after each deposit, in milliseconds
    #[arg(long = "max-delay-ms", value_name = "MILLIS", default_value_t = 1_500)]
    pub max_delay_ms: u64,

    /// Give up on the withdrawal after this many milliseconds
    #[arg(long = "timeout-ms", value_name = "MILLIS")]
    pub timeout_ms: Option<u64>,

    /// Seed for a reproducible deposit plan
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// tokio worker threads (async strategy only)
    #[arg(
        long = "worker-threads",
        value_name = "COUNT",
        help = "tokio worker threads for the async strategy (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,
}

/// Available concurrency strategies for the demo
#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

fn parse_amount_arg(input: &str) -> Result<Decimal, String> {
    parse_amount(input, "command-line amount").map_err(|e| e.to_string())
}

impl CliArgs {
    /// Create a DemoConfig from CLI arguments
    ///
    /// Unset options fall back to `DemoConfig::default()`, and invalid values
    /// are replaced by their defaults with a warning.
    pub fn to_demo_config(&self) -> DemoConfig {
        let default = DemoConfig::default();

        DemoConfig {
            initial_balance: self.initial_balance,
            opening_deposit: self.opening_deposit,
            withdrawal: self.withdrawal,
            deposits: self.deposits,
            max_deposit: self.max_deposit,
            max_delay_ms: self.max_delay_ms,
            timeout: self.timeout_ms.map(Duration::from_millis),
            seed: self.seed,
            worker_threads: self.worker_threads.unwrap_or(default.worker_threads),
        }
        .validated()
    }
}
