//! Cash flow series construction

mod data;

pub use data::{CashFlow, CashFlowSeries, DAYS_PER_YEAR};
