//! Load loan transactions from CSV (LoanID,Date,Cashflow)

use super::{LoanId, TransactionRecord};
use chrono::NaiveDate;
use csv::Reader;
use rust_decimal::Decimal;
use std::error::Error;
use std::path::Path;

/// Raw CSV row matching the transaction export columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "LoanID")]
    loan_id: u64,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Cashflow", with = "rust_decimal::serde::str")]
    cashflow: Decimal,
}

impl CsvRow {
    fn to_record(self) -> TransactionRecord {
        TransactionRecord::new(LoanId(self.loan_id), self.date, self.cashflow)
    }
}

/// Load all transactions from a CSV file, preserving row order
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<TransactionRecord>, Box<dyn Error>> {
    let reader = Reader::from_path(path)?;
    read_rows(reader)
}

/// Load transactions from any reader (e.g., string buffer, request body)
pub fn load_transactions_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<TransactionRecord>, Box<dyn Error>> {
    read_rows(Reader::from_reader(reader))
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<TransactionRecord>, Box<dyn Error>> {
    let mut records = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.to_record());
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_from_reader() {
        let data = "\
LoanID,Date,Cashflow
7,2023-01-01,-1000.00
7,2023-07-01,50.25
9,2023-03-15,-500
7,2024-01-01,1000
";
        let records = load_transactions_from_reader(data.as_bytes()).expect("Failed to load transactions");
        assert_eq!(records.len(), 4);

        let first = &records[0];
        assert_eq!(first.loan_id, LoanId(7));
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(first.cashflow, dec!(-1000.00));

        // Row order is kept as-is
        assert_eq!(records[1].cashflow, dec!(50.25));
        assert_eq!(records[2].loan_id, LoanId(9));
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let data = "LoanID,Date,Cashflow\n1,01/02/2023,100\n";
        assert!(load_transactions_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_transactions("does/not/exist.csv").is_err());
    }
}
