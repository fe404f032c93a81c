//! Pure finance maths behind the calculator and scoring.
//!
//! Rates are fractions here (`0.055`); callers holding percent units divide by 100 first.
//! Every function is total: a zero or negative denominator yields a neutral value
//! rather than `NaN` or infinity.

/// Months of amortisation credited to the five-year ROI.
pub const ROI_HORIZON_MONTHS: u32 = 60;
pub const ROI_HORIZON_YEARS: i32 = 5;

pub fn to_annual(monthly: f64) -> f64 {
    monthly * 12.0
}

pub fn gross_yield(price: f64, rent_annual: f64) -> f64 {
    if price > 0.0 {
        rent_annual / price
    } else {
        0.0
    }
}

pub fn net_yield(price: f64, rent_annual: f64, op_costs_annual: f64) -> f64 {
    if price > 0.0 {
        (rent_annual - op_costs_annual) / price
    } else {
        0.0
    }
}

/// Interest-only monthly payment.
pub fn io_monthly(rate_annual: f64, loan: f64) -> f64 {
    rate_annual * loan / 12.0
}

/// Number of monthly instalments for a term, never less than one.
pub fn term_months(term_years: f64) -> u32 {
    let months = (term_years * 12.0).round();
    if months.is_finite() && months >= 1.0 {
        months as u32
    } else {
        1
    }
}

/// Level monthly payment on an amortising loan.
pub fn pmt_monthly(rate_annual: f64, term_years: f64, loan: f64) -> f64 {
    let r = rate_annual / 12.0;
    let n = term_months(term_years);
    if r == 0.0 {
        return loan / n as f64;
    }
    let growth = (1.0 + r).powi(n as i32);
    let denominator = growth - 1.0;
    if denominator == 0.0 {
        return loan / n as f64;
    }
    r * loan * growth / denominator
}

pub fn ltv(loan: f64, price: f64) -> f64 {
    if price > 0.0 {
        loan / price
    } else {
        0.0
    }
}

/// Interest cover: monthly rent over the stressed monthly interest.
pub fn icr(rent_monthly: f64, stressed_mortgage_monthly: f64) -> f64 {
    if stressed_mortgage_monthly > 0.0 {
        rent_monthly / stressed_mortgage_monthly
    } else {
        0.0
    }
}

/// Occupancy needed to cover costs and debt. 100% when there is no rent to occupy.
pub fn break_even_occupancy(
    op_costs_annual: f64,
    mortgage_annual: f64,
    potential_rent_annual: f64,
) -> f64 {
    if potential_rent_annual > 0.0 {
        (op_costs_annual + mortgage_annual) / potential_rent_annual
    } else {
        1.0
    }
}

pub fn cash_on_cash(net_cash_flow_annual: f64, cash_invested: f64) -> f64 {
    if cash_invested > 0.0 {
        net_cash_flow_annual / cash_invested
    } else {
        0.0
    }
}

/// Inputs to the five-year return on investment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiInputs {
    pub annual_net_cash: f64,
    /// Repayment instalment; zero for interest-only loans.
    pub monthly_payment: f64,
    pub rate_annual: f64,
    pub term_years: f64,
    pub loan: f64,
    pub price: f64,
    pub growth_annual: f64,
    pub cash_invested: f64,
}

/// Principal repaid over the first `months` of an amortisation schedule.
pub fn principal_repaid(loan: f64, rate_annual: f64, monthly_payment: f64, months: u32) -> f64 {
    let r = rate_annual / 12.0;
    let mut balance = loan;
    let mut repaid = 0.0;
    for _ in 0..months {
        let interest = balance * r;
        let principal = (monthly_payment - interest).max(0.0).min(balance);
        balance -= principal;
        repaid += principal;
        if balance <= 0.0 {
            break;
        }
    }
    repaid
}

/// Five years of cashflow, principal repaid and capital growth, over cash invested.
pub fn roi_5_years(inputs: RoiInputs) -> f64 {
    if inputs.cash_invested <= 0.0 {
        return 0.0;
    }

    let principal = if inputs.monthly_payment > 0.0 {
        let months = ROI_HORIZON_MONTHS.min(term_months(inputs.term_years));
        principal_repaid(
            inputs.loan,
            inputs.rate_annual,
            inputs.monthly_payment,
            months,
        )
    } else {
        0.0
    };

    let price_after = inputs.price * (1.0 + inputs.growth_annual).powi(ROI_HORIZON_YEARS);
    let capital_gain = (price_after - inputs.price).max(0.0);
    let cashflow = inputs.annual_net_cash * ROI_HORIZON_YEARS as f64;

    let roi = (cashflow + principal + capital_gain) / inputs.cash_invested;
    if roi.is_finite() {
        roi
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-6
    }

    #[test]
    fn yields_guard_zero_price() {
        assert!(close(gross_yield(200_000.0, 12_000.0), 0.06));
        assert!(close(net_yield(200_000.0, 12_000.0, 2_000.0), 0.05));
        assert_eq!(gross_yield(0.0, 12_000.0), 0.0);
        assert_eq!(net_yield(-1.0, 12_000.0, 0.0), 0.0);
    }

    #[test]
    fn pmt_matches_annuity_formula() {
        let payment = pmt_monthly(0.06, 25.0, 150_000.0);
        assert!((payment - 966.45).abs() < 0.01, "payment was {payment}");
    }

    #[test]
    fn pmt_with_zero_rate_spreads_principal() {
        assert!(close(pmt_monthly(0.0, 10.0, 120_000.0), 1_000.0));
        assert!(close(pmt_monthly(0.0, 0.0, 500.0), 500.0));
    }

    #[test]
    fn io_and_icr() {
        let stressed = io_monthly(0.055, 150_000.0);
        assert!(close(stressed, 687.5));
        assert!(close(icr(1_000.0, stressed), 1_000.0 / 687.5));
        assert_eq!(icr(1_000.0, 0.0), 0.0);
    }

    #[test]
    fn break_even_defaults_to_full_occupancy() {
        assert_eq!(break_even_occupancy(1_000.0, 5_000.0, 0.0), 1.0);
        assert!(close(break_even_occupancy(2_000.0, 7_000.0, 12_000.0), 0.75));
    }

    #[test]
    fn cash_on_cash_guards_zero_investment() {
        assert_eq!(cash_on_cash(5_000.0, 0.0), 0.0);
        assert!(close(cash_on_cash(5_000.0, 50_000.0), 0.1));
    }

    #[test]
    fn principal_repaid_never_exceeds_loan() {
        let payment = pmt_monthly(0.05, 2.0, 10_000.0);
        let repaid = principal_repaid(10_000.0, 0.05, payment, 60);
        assert!(repaid <= 10_000.0 + 1e-6);
        assert!(repaid > 9_999.0);
    }

    #[test]
    fn roi_counts_principal_only_for_repayment() {
        let base = RoiInputs {
            annual_net_cash: 2_000.0,
            monthly_payment: 0.0,
            rate_annual: 0.05,
            term_years: 25.0,
            loan: 150_000.0,
            price: 200_000.0,
            growth_annual: 0.0,
            cash_invested: 50_000.0,
        };
        assert!(close(roi_5_years(base), 0.2));

        let repayment = RoiInputs {
            monthly_payment: pmt_monthly(0.05, 25.0, 150_000.0),
            ..base
        };
        assert!(roi_5_years(repayment) > roi_5_years(base));
    }

    #[test]
    fn roi_includes_compounded_growth() {
        let inputs = RoiInputs {
            annual_net_cash: 0.0,
            monthly_payment: 0.0,
            rate_annual: 0.0,
            term_years: 25.0,
            loan: 0.0,
            price: 100_000.0,
            growth_annual: 0.02,
            cash_invested: 100_000.0,
        };
        let expected = 1.02_f64.powi(5) - 1.0;
        assert!(close(roi_5_years(inputs), expected));
        assert_eq!(
            roi_5_years(RoiInputs {
                cash_invested: 0.0,
                ..inputs
            }),
            0.0
        );
    }
}
