//! CSV output for demo reports
//!
//! Writes a `DemoReport` as a header plus one CSV row:
//!
//! ```text
//! initial_balance,opening_deposit,deposits,deposited,withdrawal,outcome,final_balance
//! 100000,3000,5,2412,105000,settled,412
//! ```

use crate::types::{DemoReport, WithdrawalOutcome};
use serde::Serialize;
use std::io::Write;

/// Flat CSV shape of a report
#[derive(Debug, Serialize)]
struct ReportRow {
    initial_balance: String,
    opening_deposit: String,
    deposits: usize,
    deposited: String,
    withdrawal: String,
    outcome: WithdrawalOutcome,
    final_balance: String,
}

impl From<&DemoReport> for ReportRow {
    fn from(report: &DemoReport) -> Self {
        ReportRow {
            initial_balance: report.initial_balance.to_string(),
            opening_deposit: report.opening_deposit.to_string(),
            deposits: report.deposits.len(),
            deposited: report.deposited().to_string(),
            withdrawal: report.withdrawal.to_string(),
            outcome: report.outcome,
            final_balance: report.final_balance.to_string(),
        }
    }
}

/// Write a demo report as CSV to the given output
///
/// Writes a header and one row with columns: initial_balance, opening_deposit,
/// deposits, deposited, withdrawal, outcome, final_balance
///
/// # Arguments
///
/// * `report` - The finished demo run to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_report(report: &DemoReport, output: &mut dyn Write) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .serialize(ReportRow::from(report))
        .map_err(|e| format!("Failed to write report record: {}", e))?;

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
