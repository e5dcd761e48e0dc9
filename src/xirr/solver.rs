//! Extended Internal Rate of Return (XIRR) solver
//!
//! Newton-Raphson on the dated NPV function. Used to compute the money-weighted
//! return of a loan from its transaction history.

use log::{debug, warn};
use serde::Serialize;

use super::npv::{dnpv, npv};
use super::SolverConfig;
use crate::cashflow::CashFlowSeries;
use crate::error::{XirrError, XirrResult};

/// Converged XIRR together with run statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct XirrSolution {
    /// Annual rate as a decimal (e.g., 0.05 for 5%)
    pub rate: f64,

    /// Newton steps taken, including the one that met the tolerance
    pub iterations: u32,

    /// NPV at `rate`. Not part of the convergence test, so it can be
    /// noticeably non-zero for loose tolerances.
    pub residual: f64,
}

/// Stateless Newton-Raphson XIRR solver
#[derive(Debug, Clone, Copy, Default)]
pub struct XirrSolver {
    config: SolverConfig,
}

impl XirrSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve for the rate at which the series' NPV is zero
    pub fn solve(&self, series: &CashFlowSeries) -> XirrResult<f64> {
        self.solve_detailed(series).map(|solution| solution.rate)
    }

    /// Solve and also report iteration count and NPV residual.
    ///
    /// Converges when two successive iterates are closer than the tolerance.
    /// A non-finite iterate fails immediately, and running out of iterations
    /// is a failure rather than a best-effort answer.
    pub fn solve_detailed(&self, series: &CashFlowSeries) -> XirrResult<XirrSolution> {
        self.config.validate()?;

        if !series.has_sign_change() {
            warn!(
                "XIRR requested for {} cash flows without a sign change; no root expected",
                series.len()
            );
        }

        let mut x0 = self.config.guess;

        for i in 0..self.config.max_iterations {
            let f_value = npv(series, x0);
            let f_prime = dnpv(series, x0);

            let x1 = x0 - f_value / f_prime;

            debug!(
                "XIRR iteration {}: rate={} npv={} dnpv={} next={}",
                i + 1,
                x0,
                f_value,
                f_prime,
                x1
            );

            if !x1.is_finite() {
                warn!("XIRR iterate became non-finite at iteration {}", i + 1);
                return Err(XirrError::NonFiniteIterate {
                    iteration: i + 1,
                    rate: x0,
                    derivative: f_prime,
                });
            }

            if (x1 - x0).abs() < self.config.tolerance {
                return Ok(XirrSolution {
                    rate: x1,
                    iterations: i + 1,
                    residual: npv(series, x1),
                });
            }

            x0 = x1;
        }

        warn!(
            "XIRR did not converge within {} iterations",
            self.config.max_iterations
        );
        Err(XirrError::DidNotConverge {
            iterations: self.config.max_iterations,
            last_rate: x0,
        })
    }
}

/// Compute the XIRR of a cash flow series.
///
/// Use `SolverConfig::default()` for the standard 10% guess, 0.001 tolerance
/// and 100-iteration budget.
pub fn solve_xirr(series: &CashFlowSeries, config: &SolverConfig) -> XirrResult<f64> {
    XirrSolver::new(*config).solve(series)
}
