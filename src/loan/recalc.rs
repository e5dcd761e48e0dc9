//! Recompute and persist a loan's XIRR when its transactions change

use log::{info, warn};
use rayon::prelude::*;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use super::ledger::{LedgerError, RateSink, TransactionSource, TriggerContext};
use super::{LoanId, TransactionRecord};
use crate::cashflow::CashFlowSeries;
use crate::error::XirrError;
use crate::xirr::{SolverConfig, XirrSolver};

/// Decimal places kept when the rate is stored on the loan
pub const XIRR_DECIMAL_PLACES: u32 = 10;

#[derive(Error, Debug)]
pub enum RecalcError {
    #[error("error retrieving transactions for loan {loan_id}")]
    Fetch {
        loan_id: LoanId,
        #[source]
        source: LedgerError,
    },

    #[error("error during XIRR calculation for loan {loan_id}")]
    Calculation {
        loan_id: LoanId,
        #[source]
        source: XirrError,
    },

    #[error("XIRR {rate} for loan {loan_id} cannot be stored as a decimal")]
    RateOutOfRange { loan_id: LoanId, rate: f64 },

    #[error("error during loan update for loan {loan_id}")]
    LoanUpdate {
        loan_id: LoanId,
        #[source]
        source: LedgerError,
    },
}

/// Convert stored transactions into a solver-ready series, in stored order
pub fn series_from_transactions(records: &[TransactionRecord]) -> Result<CashFlowSeries, XirrError> {
    let dates: Vec<_> = records.iter().map(|tx| tx.date).collect();
    let amounts: Vec<Decimal> = records.iter().map(|tx| tx.cashflow).collect();
    CashFlowSeries::from_decimal(&dates, &amounts)
}

/// Orchestrates fetch → solve → persist for loans in a ledger
pub struct XirrRecalculator<'a, S, K> {
    source: &'a S,
    sink: &'a K,
    solver: XirrSolver,
}

impl<'a, S, K> XirrRecalculator<'a, S, K>
where
    S: TransactionSource,
    K: RateSink,
{
    pub fn new(source: &'a S, sink: &'a K, config: SolverConfig) -> Self {
        Self {
            source,
            sink,
            solver: XirrSolver::new(config),
        }
    }

    /// Handle a transaction change. Changes that reference no loan are
    /// ignored and return `Ok(None)`.
    pub fn on_transaction_changed<C: TriggerContext>(
        &self,
        ctx: &C,
    ) -> Result<Option<Decimal>, RecalcError> {
        match ctx.changed_loan() {
            Some(loan_id) => self.recalculate_loan(loan_id).map(Some),
            None => Ok(None),
        }
    }

    /// Recompute the XIRR of one loan and write it back
    pub fn recalculate_loan(&self, loan_id: LoanId) -> Result<Decimal, RecalcError> {
        let records = self
            .source
            .transactions_for(loan_id)
            .map_err(|source| RecalcError::Fetch { loan_id, source })?;

        let rate = series_from_transactions(&records)
            .and_then(|series| self.solver.solve(&series))
            .map_err(|source| {
                warn!("XIRR calculation failed for loan {}: {}", loan_id, source);
                RecalcError::Calculation { loan_id, source }
            })?;

        let xirr = Decimal::from_f64(rate)
            .map(|d| d.round_dp(XIRR_DECIMAL_PLACES))
            .ok_or(RecalcError::RateOutOfRange { loan_id, rate })?;

        let version = self
            .sink
            .current_version(loan_id)
            .map_err(|source| RecalcError::LoanUpdate { loan_id, source })?;

        let new_version = self
            .sink
            .update_xirr(loan_id, xirr, version)
            .map_err(|source| RecalcError::LoanUpdate { loan_id, source })?;

        info!(
            "Loan {}: XIRR {} from {} transactions (version {:?})",
            loan_id,
            xirr,
            records.len(),
            new_version
        );
        Ok(xirr)
    }
}

impl<'a, S, K> XirrRecalculator<'a, S, K>
where
    S: TransactionSource + Sync,
    K: RateSink + Sync,
{
    /// Recalculate many loans in parallel. Results come back in input order.
    pub fn recalculate_all(&self, loan_ids: &[LoanId]) -> Vec<(LoanId, Result<Decimal, RecalcError>)> {
        loan_ids
            .par_iter()
            .map(|&loan_id| (loan_id, self.recalculate_loan(loan_id)))
            .collect()
    }
}
