//! Loan XIRR CLI
//!
//! Recalculates the XIRR of every loan in a transaction export
//! (LoanID,Date,Cashflow). Solver settings come from XIRR_GUESS,
//! XIRR_TOLERANCE and XIRR_MAX_ITERATIONS, overridden by flags.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use loan_xirr::loan::{load_transactions, InMemoryLedger, LoanId, XirrRecalculator};
use loan_xirr::SolverConfig;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

/// Compute loan XIRRs from a transaction CSV
#[derive(Parser, Debug)]
#[command(name = "loan_xirr", version, about)]
struct Cli {
    /// Transaction CSV with LoanID,Date,Cashflow columns
    #[arg(long)]
    transactions: PathBuf,

    /// Only recalculate this loan
    #[arg(long)]
    loan_id: Option<u64>,

    /// Initial rate estimate
    #[arg(long)]
    guess: Option<f64>,

    /// Convergence threshold on successive iterates
    #[arg(long)]
    tolerance: Option<f64>,

    /// Newton-Raphson iteration budget
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct LoanResult {
    loan_id: LoanId,
    xirr: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn solver_config(cli: &Cli) -> SolverConfig {
    let mut config = SolverConfig::from_env();
    if let Some(guess) = cli.guess {
        config = config.with_guess(guess);
    }
    if let Some(tolerance) = cli.tolerance {
        config = config.with_tolerance(tolerance);
    }
    if let Some(max_iterations) = cli.max_iterations {
        config = config.with_max_iterations(max_iterations);
    }
    config
}

/// Full error chain on one line, e.g. "error during XIRR calculation: ..."
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = solver_config(&cli);
    config.validate().context("invalid solver settings")?;

    let start = Instant::now();
    let records = load_transactions(&cli.transactions)
        .map_err(|e| anyhow!("{}", e))
        .with_context(|| format!("failed to load {}", cli.transactions.display()))?;
    log::info!("Loaded {} transactions in {:?}", records.len(), start.elapsed());

    let ledger = InMemoryLedger::from_transactions(records);
    let loan_ids = match cli.loan_id {
        Some(id) => vec![LoanId(id)],
        None => ledger.loan_ids()?,
    };

    let recalc = XirrRecalculator::new(&ledger, &ledger, config);
    let results: Vec<LoanResult> = recalc
        .recalculate_all(&loan_ids)
        .into_iter()
        .map(|(loan_id, outcome)| match outcome {
            Ok(xirr) => LoanResult { loan_id, xirr: Some(xirr), error: None },
            Err(e) => LoanResult { loan_id, xirr: None, error: Some(describe(&e)) },
        })
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("{:>10} {:>16}  {}", "LoanID", "XIRR", "Error");
        println!("{}", "-".repeat(60));
        for row in &results {
            let xirr = row.xirr.map(|x| x.to_string()).unwrap_or_default();
            println!(
                "{:>10} {:>16}  {}",
                row.loan_id,
                xirr,
                row.error.as_deref().unwrap_or("")
            );
        }
        println!("\n{} loans in {:?}", results.len(), start.elapsed());
    }

    if results.iter().any(|row| row.error.is_some()) {
        process::exit(1);
    }
    Ok(())
}
