//! Loan records, transaction loading and XIRR recalculation

mod data;
mod ledger;
pub mod loader;
mod recalc;

pub use data::{LoanId, LoanRecord, RowVersion, TransactionImage, TransactionRecord};
pub use ledger::{
    InMemoryLedger, LedgerError, RateSink, TransactionChange, TransactionSource, TriggerContext,
};
pub use loader::{load_transactions, load_transactions_from_reader};
pub use recalc::{series_from_transactions, RecalcError, XirrRecalculator, XIRR_DECIMAL_PLACES};
