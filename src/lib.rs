//! Loan XIRR - money-weighted return of irregular loan cash flows
//!
//! This library provides:
//! - Dated cash flow series with a fixed-point to `f64` conversion boundary
//! - NPV and its rate derivative on a 365.25-day year
//! - A Newton-Raphson XIRR solver with typed failures
//! - Loan recalculation against pluggable transaction sources and rate sinks

pub mod cashflow;
pub mod error;
pub mod loan;
pub mod xirr;

// Re-export commonly used types
pub use cashflow::{CashFlow, CashFlowSeries};
pub use error::{XirrError, XirrResult};
pub use loan::{InMemoryLedger, LoanId, XirrRecalculator};
pub use xirr::{solve_xirr, SolverConfig, XirrSolution, XirrSolver};
