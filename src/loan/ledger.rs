//! Capabilities the recalculation workflow needs from its host, plus an
//! in-memory ledger implementing them

use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::RwLock;
use thiserror::Error;

use super::{LoanId, LoanRecord, RowVersion, TransactionImage, TransactionRecord};

/// Failures reported by a transaction source or rate sink
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Loan {0} not found")]
    LoanNotFound(LoanId),

    /// The loan was written by someone else since its version was read
    #[error("Loan {loan_id} was modified concurrently (expected version {expected:?}, found {actual:?})")]
    ConcurrencyConflict {
        loan_id: LoanId,
        expected: RowVersion,
        actual: RowVersion,
    },

    #[error("Ledger storage error: {0}")]
    Storage(String),
}

/// Data-fetch capability: all transactions booked against a loan
pub trait TransactionSource {
    fn transactions_for(&self, loan_id: LoanId) -> Result<Vec<TransactionRecord>, LedgerError>;
}

/// Data-write capability with optimistic concurrency on the loan record
pub trait RateSink {
    /// Current version of the loan record
    fn current_version(&self, loan_id: LoanId) -> Result<RowVersion, LedgerError>;

    /// Store `xirr` on the loan if its version still equals `expected`.
    /// Returns the new version.
    fn update_xirr(
        &self,
        loan_id: LoanId,
        xirr: Decimal,
        expected: RowVersion,
    ) -> Result<RowVersion, LedgerError>;
}

/// Trigger capability: which loan, if any, a transaction change touched
pub trait TriggerContext {
    fn changed_loan(&self) -> Option<LoanId>;
}

/// Transaction change notification carrying the pre-change image
#[derive(Debug, Clone, Default)]
pub struct TransactionChange {
    pub pre_image: Option<TransactionImage>,
}

impl TransactionChange {
    pub fn for_loan(loan_id: LoanId) -> Self {
        Self {
            pre_image: Some(TransactionImage { loan_id: Some(loan_id) }),
        }
    }
}

impl TriggerContext for TransactionChange {
    fn changed_loan(&self) -> Option<LoanId> {
        self.pre_image.as_ref().and_then(|image| image.loan_id)
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    transactions: Vec<TransactionRecord>,
    loans: BTreeMap<LoanId, LoanRecord>,
}

/// Thread-safe in-memory store of loans and their transactions
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

fn poisoned<T>(_: T) -> LedgerError {
    LedgerError::Storage("ledger lock poisoned".into())
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from transactions, creating a loan record for every
    /// loan they reference
    pub fn from_transactions(transactions: Vec<TransactionRecord>) -> Self {
        let mut loans = BTreeMap::new();
        for tx in &transactions {
            loans
                .entry(tx.loan_id)
                .or_insert_with(|| LoanRecord::new(tx.loan_id));
        }

        Self {
            state: RwLock::new(LedgerState { transactions, loans }),
        }
    }

    /// Append a transaction, creating its loan record if needed
    pub fn add_transaction(&self, tx: TransactionRecord) -> Result<(), LedgerError> {
        let mut state = self.state.write().map_err(poisoned)?;
        state
            .loans
            .entry(tx.loan_id)
            .or_insert_with(|| LoanRecord::new(tx.loan_id));
        state.transactions.push(tx);
        Ok(())
    }

    pub fn loan(&self, loan_id: LoanId) -> Result<LoanRecord, LedgerError> {
        let state = self.state.read().map_err(poisoned)?;
        state
            .loans
            .get(&loan_id)
            .cloned()
            .ok_or(LedgerError::LoanNotFound(loan_id))
    }

    /// All loan ids in ascending order
    pub fn loan_ids(&self) -> Result<Vec<LoanId>, LedgerError> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.loans.keys().copied().collect())
    }
}

impl TransactionSource for InMemoryLedger {
    fn transactions_for(&self, loan_id: LoanId) -> Result<Vec<TransactionRecord>, LedgerError> {
        let state = self.state.read().map_err(poisoned)?;
        if !state.loans.contains_key(&loan_id) {
            return Err(LedgerError::LoanNotFound(loan_id));
        }

        let records: Vec<TransactionRecord> = state
            .transactions
            .iter()
            .filter(|tx| tx.loan_id == loan_id)
            .cloned()
            .collect();

        debug!("Fetched {} transactions for loan {}", records.len(), loan_id);
        Ok(records)
    }
}

impl RateSink for InMemoryLedger {
    fn current_version(&self, loan_id: LoanId) -> Result<RowVersion, LedgerError> {
        self.loan(loan_id).map(|loan| loan.version)
    }

    fn update_xirr(
        &self,
        loan_id: LoanId,
        xirr: Decimal,
        expected: RowVersion,
    ) -> Result<RowVersion, LedgerError> {
        let mut state = self.state.write().map_err(poisoned)?;
        let loan = state
            .loans
            .get_mut(&loan_id)
            .ok_or(LedgerError::LoanNotFound(loan_id))?;

        if loan.version != expected {
            warn!(
                "Rejecting XIRR update for loan {}: version {:?} != {:?}",
                loan_id, loan.version, expected
            );
            return Err(LedgerError::ConcurrencyConflict {
                loan_id,
                expected,
                actual: loan.version,
            });
        }

        loan.xirr = Some(xirr);
        loan.version = loan.version.next();
        Ok(loan.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn tx(loan: u64, y: i32, m: u32, d: u32, amount: Decimal) -> TransactionRecord {
        TransactionRecord::new(LoanId(loan), NaiveDate::from_ymd_opt(y, m, d).unwrap(), amount)
    }

    fn sample_ledger() -> InMemoryLedger {
        InMemoryLedger::from_transactions(vec![
            tx(1, 2023, 1, 1, dec!(-1000)),
            tx(2, 2023, 2, 1, dec!(-500)),
            tx(1, 2024, 1, 1, dec!(1100)),
        ])
    }

    #[test]
    fn test_transactions_for_filters_and_keeps_order() {
        let ledger = sample_ledger();
        let records = ledger.transactions_for(LoanId(1)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].cashflow, dec!(-1000));
        assert_eq!(records[1].cashflow, dec!(1100));
        assert_eq!(ledger.loan_ids().unwrap(), vec![LoanId(1), LoanId(2)]);
    }

    #[test]
    fn test_unknown_loan() {
        let ledger = sample_ledger();
        assert_eq!(
            ledger.transactions_for(LoanId(99)).unwrap_err(),
            LedgerError::LoanNotFound(LoanId(99))
        );
    }

    #[test]
    fn test_update_bumps_version() {
        let ledger = sample_ledger();
        let v0 = ledger.current_version(LoanId(1)).unwrap();

        let v1 = ledger.update_xirr(LoanId(1), dec!(0.1), v0).unwrap();
        assert_eq!(v1, v0.next());

        let loan = ledger.loan(LoanId(1)).unwrap();
        assert_eq!(loan.xirr, Some(dec!(0.1)));
        assert_eq!(loan.version, v1);
    }

    #[test]
    fn test_stale_version_is_rejected() {
        let ledger = sample_ledger();
        let stale = ledger.current_version(LoanId(1)).unwrap();
        ledger.update_xirr(LoanId(1), dec!(0.1), stale).unwrap();

        let err = ledger.update_xirr(LoanId(1), dec!(0.2), stale).unwrap_err();
        assert!(matches!(err, LedgerError::ConcurrencyConflict { .. }));
        assert_eq!(ledger.loan(LoanId(1)).unwrap().xirr, Some(dec!(0.1)));
    }

    #[test]
    fn test_trigger_context() {
        assert_eq!(TransactionChange::for_loan(LoanId(4)).changed_loan(), Some(LoanId(4)));
        assert_eq!(TransactionChange::default().changed_loan(), None);

        let orphan = TransactionChange {
            pre_image: Some(TransactionImage { loan_id: None }),
        };
        assert_eq!(orphan.changed_loan(), None);
    }

    #[test]
    fn test_add_transaction_creates_loan() {
        let ledger = InMemoryLedger::new();
        ledger.add_transaction(tx(3, 2023, 1, 1, dec!(-10))).unwrap();
        assert_eq!(ledger.loan(LoanId(3)).unwrap().version, RowVersion(0));
    }
}
