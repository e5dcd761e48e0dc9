//! Error types for XIRR calculation

use thiserror::Error;

/// A specialized Result type for XIRR operations.
pub type XirrResult<T> = Result<T, XirrError>;

/// Errors raised while building a cash flow series or solving for its XIRR
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XirrError {
    /// Newton-Raphson used up its iteration budget without two successive
    /// iterates coming within tolerance of each other.
    #[error("XIRR did not converge after {iterations} iterations (last rate: {last_rate})")]
    DidNotConverge {
        iterations: u32,
        last_rate: f64,
    },

    /// An iterate became NaN or infinite, usually from a zero derivative
    /// or a rate driven towards -100%.
    #[error("XIRR iterate became non-finite at iteration {iteration} (rate: {rate}, derivative: {derivative})")]
    NonFiniteIterate {
        iteration: u32,
        rate: f64,
        derivative: f64,
    },

    /// The supplied dates/amounts cannot form a cash flow series.
    #[error("Invalid cash flow input: {0}")]
    InvalidInput(String),

    /// Solver settings that cannot produce a meaningful run.
    #[error("Invalid solver configuration: {field} ({reason})")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
}

impl XirrError {
    /// True for both flavours of Newton-Raphson failure.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(
            self,
            XirrError::DidNotConverge { .. } | XirrError::NonFiniteIterate { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_classification() {
        let stalled = XirrError::DidNotConverge { iterations: 100, last_rate: 0.2 };
        let blown_up = XirrError::NonFiniteIterate { iteration: 1, rate: f64::NAN, derivative: 0.0 };
        let bad_input = XirrError::InvalidInput("empty series".into());

        assert!(stalled.is_convergence_failure());
        assert!(blown_up.is_convergence_failure());
        assert!(!bad_input.is_convergence_failure());
    }

    #[test]
    fn test_messages() {
        let err = XirrError::DidNotConverge { iterations: 100, last_rate: 0.25 };
        assert_eq!(
            err.to_string(),
            "XIRR did not converge after 100 iterations (last rate: 0.25)"
        );
    }
}
