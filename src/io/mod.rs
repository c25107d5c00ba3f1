//! I/O module
//!
//! Handles output of demo results.
//!
//! # Components
//!
//! - `report` - CSV serialization of a `DemoReport`

pub mod report;

pub use report::write_report;
