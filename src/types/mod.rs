//! Types module
//!
//! Contains the value types shared by the guards and the demo driver:
//! - `amount`: amount validation and conversion
//! - `error`: error types for guard operations
//! - `report`: outcome of a demo run

pub mod amount;
pub mod error;
pub mod report;

pub use amount::{amount_from_f64, parse_amount, validate_amount};
pub use error::GuardError;
pub use report::{DemoReport, WithdrawalOutcome};
