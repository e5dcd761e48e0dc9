//! Dated cash flow series used by the XIRR solver

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{XirrError, XirrResult};

/// Days per year used for the discounting exponent (absorbs leap days)
pub const DAYS_PER_YEAR: f64 = 365.25;

/// A single dated cash flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    /// Settlement date
    pub date: NaiveDate,

    /// Signed amount (negative = paid out, positive = received)
    pub amount: f64,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Ordered cash flows with at least one element and finite amounts.
///
/// The first element is the anchor date for discounting regardless of
/// whether it is the earliest date in the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowSeries {
    flows: Vec<CashFlow>,
}

impl CashFlowSeries {
    /// Build a series from already-paired flows
    pub fn from_flows(flows: Vec<CashFlow>) -> XirrResult<Self> {
        if flows.is_empty() {
            return Err(XirrError::InvalidInput(
                "cash flow series must contain at least one flow".into(),
            ));
        }

        if let Some((i, cf)) = flows.iter().enumerate().find(|(_, cf)| !cf.amount.is_finite()) {
            return Err(XirrError::InvalidInput(format!(
                "amount at index {} is not finite ({})",
                i, cf.amount
            )));
        }

        Ok(Self { flows })
    }

    /// Build a series from parallel date and amount lists
    pub fn new(dates: &[NaiveDate], amounts: &[f64]) -> XirrResult<Self> {
        check_lengths(dates.len(), amounts.len())?;

        let flows = dates
            .iter()
            .zip(amounts)
            .map(|(&date, &amount)| CashFlow::new(date, amount))
            .collect();

        Self::from_flows(flows)
    }

    /// Build a series from fixed-point amounts.
    ///
    /// Each amount is converted to `f64` here, once, so the solver never
    /// touches decimal arithmetic.
    pub fn from_decimal(dates: &[NaiveDate], amounts: &[Decimal]) -> XirrResult<Self> {
        check_lengths(dates.len(), amounts.len())?;

        let mut flows = Vec::with_capacity(amounts.len());
        for (i, (&date, amount)) in dates.iter().zip(amounts).enumerate() {
            let value = amount.to_f64().ok_or_else(|| {
                XirrError::InvalidInput(format!(
                    "amount at index {} ({}) cannot be represented as f64",
                    i, amount
                ))
            })?;
            flows.push(CashFlow::new(date, value));
        }

        Self::from_flows(flows)
    }

    /// Anchor date for discounting (date of the first element)
    pub fn anchor_date(&self) -> NaiveDate {
        self.flows[0].date
    }

    pub fn flows(&self) -> &[CashFlow] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Never true for a constructed series
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Iterate `(year_fraction, amount)` pairs measured from the anchor date
    pub fn year_fractions(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let anchor = self.anchor_date();
        self.flows.iter().map(move |cf| {
            let days = (cf.date - anchor).num_days() as f64;
            (days / DAYS_PER_YEAR, cf.amount)
        })
    }

    /// True if the series contains both an inflow and an outflow
    pub fn has_sign_change(&self) -> bool {
        let has_positive = self.flows.iter().any(|cf| cf.amount > 0.0);
        let has_negative = self.flows.iter().any(|cf| cf.amount < 0.0);
        has_positive && has_negative
    }
}

fn check_lengths(dates: usize, amounts: usize) -> XirrResult<()> {
    if dates != amounts {
        return Err(XirrError::InvalidInput(format!(
            "{} dates supplied for {} amounts",
            dates, amounts
        )));
    }
    Ok(())
}
