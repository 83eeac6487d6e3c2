#![deny(warnings)]

//! Strategy economics for the castle runway planner.
//!
//! This crate turns a baseline [`FinancialData`](runway_core::FinancialData)
//! and a [`StrategySettings`](runway_core::StrategySettings) vector into:
//! - a one-month projection (what next month looks like under the strategy)
//! - a 24-month simulation with break-even, cash-out and peak-cash markers
//!
//! The revenue-growth lever is read two ways and both are kept explicit:
//! [`apply_percent`] applies the percentage once, as the projection does;
//! [`apply_annualized_percent`] treats it as an annual rate compounded
//! monthly, as the simulator does.

mod projection;
mod simulate;

pub use projection::*;
pub use simulate::*;
