//! Net present value of a dated cash flow series and its rate derivative

use crate::cashflow::CashFlowSeries;

/// NPV at an annual `rate`, discounting every flow back to the anchor date.
///
/// `Σ amount_i / (1 + rate)^(days_i / 365.25)`. The anchor flow is never
/// discounted.
pub fn npv(series: &CashFlowSeries, rate: f64) -> f64 {
    let base = 1.0 + rate;
    series
        .year_fractions()
        .map(|(t, cf)| cf / base.powf(t))
        .sum()
}

/// Derivative of the NPV with respect to `rate`.
///
/// `Σ -amount_i · t_i / (1 + rate)^(2 · t_i)` with `t_i = days_i / 365.25`.
/// Goes non-finite as `rate` approaches -1.
pub fn dnpv(series: &CashFlowSeries, rate: f64) -> f64 {
    let base = 1.0 + rate;
    let mut result = 0.0;

    for (t, cf) in series.year_fractions() {
        result -= cf * t / base.powf(2.0 * t);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::DAYS_PER_YEAR;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn one_year_loan() -> CashFlowSeries {
        CashFlowSeries::new(&[date(2023, 1, 1), date(2024, 1, 1)], &[-1000.0, 1100.0]).unwrap()
    }

    #[test]
    fn test_npv_at_zero_rate_is_sum() {
        let series = one_year_loan();
        assert_relative_eq!(npv(&series, 0.0), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_npv_discounts_by_day_count() {
        let series = one_year_loan();
        let t = 365.0 / DAYS_PER_YEAR;
        let expected = -1000.0 + 1100.0 / 1.1_f64.powf(t);
        assert_relative_eq!(npv(&series, 0.1), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_single_flow_npv_is_constant() {
        let series = CashFlowSeries::new(&[date(2023, 1, 1)], &[250.0]).unwrap();
        for rate in [-0.5, 0.0, 0.1, 3.0] {
            assert_eq!(npv(&series, rate), 250.0);
            assert_eq!(dnpv(&series, rate), 0.0);
        }
    }

    #[test]
    fn test_dnpv_closed_form() {
        let series = one_year_loan();
        let t = 365.0 / DAYS_PER_YEAR;
        let expected = -1100.0 * t / 1.1_f64.powf(2.0 * t);
        assert_relative_eq!(dnpv(&series, 0.1), expected, epsilon = 1e-9);
        // Higher rate lowers the value of the inflow
        assert!(dnpv(&series, 0.1) < 0.0);
    }

    #[test]
    fn test_dnpv_non_finite_at_minus_one() {
        let series = one_year_loan();
        assert!(!dnpv(&series, -1.0).is_finite());
    }

    #[test]
    fn test_does_not_mutate_series() {
        let series = one_year_loan();
        let before = series.clone();
        let _ = npv(&series, 0.07);
        let _ = dnpv(&series, 0.07);
        assert_eq!(series, before);
    }
}
