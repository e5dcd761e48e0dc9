//! Solver settings with environment overrides

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{XirrError, XirrResult};

/// Default starting rate (10%)
pub const DEFAULT_GUESS: f64 = 0.1;

/// Default maximum distance between successive iterates
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Default iteration budget
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

fn default_guess() -> f64 { DEFAULT_GUESS }
fn default_tolerance() -> f64 { DEFAULT_TOLERANCE }
fn default_max_iterations() -> u32 { DEFAULT_MAX_ITERATIONS }

/// Newton-Raphson settings for the XIRR solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Initial rate estimate
    #[serde(default = "default_guess")]
    pub guess: f64,

    /// Convergence threshold on |x1 - x0|
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Upper bound on Newton steps
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            guess: DEFAULT_GUESS,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    /// Read settings from `XIRR_GUESS`, `XIRR_TOLERANCE` and
    /// `XIRR_MAX_ITERATIONS`; unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self {
            guess: env::var("XIRR_GUESS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_GUESS),
            tolerance: env::var("XIRR_TOLERANCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TOLERANCE),
            max_iterations: env::var("XIRR_MAX_ITERATIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_ITERATIONS),
        }
    }

    pub fn with_guess(mut self, guess: f64) -> Self {
        self.guess = guess;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Reject settings the solver cannot run with
    pub fn validate(&self) -> XirrResult<()> {
        if !self.guess.is_finite() {
            return Err(XirrError::InvalidConfig {
                field: "guess",
                reason: format!("must be finite, got {}", self.guess),
            });
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(XirrError::InvalidConfig {
                field: "tolerance",
                reason: format!("must be a positive finite number, got {}", self.tolerance),
            });
        }
        if self.max_iterations == 0 {
            return Err(XirrError::InvalidConfig {
                field: "max_iterations",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.guess, 0.1);
        assert_eq!(config.tolerance, 0.001);
        assert_eq!(config.max_iterations, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SolverConfig = serde_json::from_str(r#"{"tolerance": 1e-6}"#).unwrap();
        assert_eq!(config.guess, DEFAULT_GUESS);
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let base = SolverConfig::default();
        assert!(base.with_tolerance(0.0).validate().is_err());
        assert!(base.with_tolerance(f64::NAN).validate().is_err());
        assert!(base.with_max_iterations(0).validate().is_err());
        assert!(base.with_guess(f64::INFINITY).validate().is_err());
    }
}
