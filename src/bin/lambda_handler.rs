//! AWS Lambda handler computing XIRR for a posted cash flow series
//!
//! Accepts `{"dates": [...], "amounts": [...], "guess"?, "tolerance"?, "max_iterations"?}`
//! and returns the rate. Solver failures are reported in the `error` field
//! rather than failing the invocation.

use chrono::NaiveDate;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use loan_xirr::{CashFlowSeries, SolverConfig, XirrSolver};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Input cash flows and optional solver overrides
#[derive(Debug, Deserialize)]
pub struct XirrRequest {
    pub dates: Vec<NaiveDate>,
    pub amounts: Vec<f64>,
    #[serde(flatten)]
    pub solver: SolverConfig,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct XirrResponse {
    pub xirr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residual: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_time_ms: u64,
}

fn compute(request: &XirrRequest) -> XirrResponse {
    let start = Instant::now();

    let outcome = CashFlowSeries::new(&request.dates, &request.amounts)
        .and_then(|series| XirrSolver::new(request.solver).solve_detailed(&series));

    let execution_time_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(solution) => XirrResponse {
            xirr: Some(solution.rate),
            iterations: Some(solution.iterations),
            residual: Some(solution.residual),
            error: None,
            execution_time_ms,
        },
        Err(e) => {
            log::warn!("XIRR request failed: {}", e);
            XirrResponse {
                xirr: None,
                iterations: None,
                residual: None,
                error: Some(e.to_string()),
                execution_time_ms,
            }
        }
    }
}

async fn handler(event: LambdaEvent<XirrRequest>) -> Result<XirrResponse, Error> {
    log::info!("Received {} cash flows", event.payload.amounts.len());
    Ok(compute(&event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: XirrRequest = serde_json::from_str(
            r#"{"dates": ["2023-01-01", "2024-01-01"], "amounts": [-1000, 1100]}"#,
        )
        .unwrap();
        assert_eq!(request.solver, SolverConfig::default());

        let response = compute(&request);
        let rate = response.xirr.unwrap();
        assert!((rate - 0.10).abs() < 0.001, "got {}", rate);
        assert!(response.error.is_none());
    }

    #[test]
    fn test_overrides_and_failure() {
        let request: XirrRequest = serde_json::from_str(
            r#"{"dates": ["2023-01-01"], "amounts": [500], "max_iterations": 5}"#,
        )
        .unwrap();
        assert_eq!(request.solver.max_iterations, 5);

        let response = compute(&request);
        assert_eq!(response.xirr, None);
        assert!(response.error.is_some());
    }

    #[test]
    fn test_mismatched_lengths() {
        let request: XirrRequest = serde_json::from_str(
            r#"{"dates": ["2023-01-01", "2024-01-01"], "amounts": [-1000]}"#,
        )
        .unwrap();

        let response = compute(&request);
        let error = response.error.unwrap();
        assert!(error.starts_with("Invalid cash flow input"), "got {}", error);
    }
}
