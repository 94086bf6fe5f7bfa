//! Meadcalc Tools module
//!
//! MCP tool implementations for the mead calculator.

pub mod allocations;
pub mod calculations;
pub mod status;
pub mod units;
