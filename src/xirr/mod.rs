//! XIRR computation: NPV engine and Newton-Raphson solver

mod config;
pub mod npv;
mod solver;

pub use config::{SolverConfig, DEFAULT_GUESS, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
pub use npv::{dnpv, npv};
pub use solver::{solve_xirr, XirrSolution, XirrSolver};
