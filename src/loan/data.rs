//! Loan and transaction records as seen by the recalculation workflow

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a loan record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version stamp of a loan record, bumped on every successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowVersion(pub u64);

impl RowVersion {
    pub fn next(self) -> Self {
        RowVersion(self.0 + 1)
    }
}

/// A single transaction booked against a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub loan_id: LoanId,
    pub date: NaiveDate,
    /// Signed cash flow (negative = disbursed, positive = repaid)
    pub cashflow: Decimal,
}

impl TransactionRecord {
    pub fn new(loan_id: LoanId, date: NaiveDate, cashflow: Decimal) -> Self {
        Self { loan_id, date, cashflow }
    }
}

/// Stored state of a loan record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanRecord {
    pub loan_id: LoanId,
    /// Last persisted XIRR, if one has been computed
    pub xirr: Option<Decimal>,
    pub version: RowVersion,
}

impl LoanRecord {
    pub fn new(loan_id: LoanId) -> Self {
        Self {
            loan_id,
            xirr: None,
            version: RowVersion::default(),
        }
    }
}

/// Pre-change image of a transaction, as handed over by whatever fired the
/// recalculation. The loan reference may be absent on orphaned transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionImage {
    #[serde(default)]
    pub loan_id: Option<LoanId>,
}
