use super::error::ModelError;
use super::types::{
    BuyInputs, BuyResult, Cheaper, Comparison, HorizonResult, HorizonSweep, RentInputs,
    RentResult, ScheduleYear,
};

const MONTHS_PER_YEAR: u32 = 12;

/// Longest horizon the per-year outputs (sweep, schedule) will materialize.
pub const MAX_TABULATED_YEARS: u32 = 1_000;

#[derive(Debug, Clone, Copy)]
struct PeriodSplit {
    interest: f64,
    principal: f64,
}

/// Outstanding mortgage, stepped one monthly payment at a time.
#[derive(Debug)]
struct Loan {
    balance: f64,
    monthly_rate: f64,
    payment: f64,
    payments_left: u32,
}

impl Loan {
    fn new(principal: f64, monthly_rate: f64, payment: f64, payments: u32) -> Self {
        Self {
            balance: principal,
            monthly_rate,
            payment,
            payments_left: payments,
        }
    }

    fn step(&mut self) -> PeriodSplit {
        if self.payments_left == 0 || self.balance <= 0.0 {
            self.balance = self.balance.max(0.0);
            return PeriodSplit {
                interest: 0.0,
                principal: 0.0,
            };
        }
        self.payments_left -= 1;

        let interest = self.balance * self.monthly_rate;
        let principal = self.payment - interest;
        let next_balance = self.balance - principal;
        // Paid off, or the final payment settling rounding residue.
        if next_balance <= 0.0 || self.payments_left == 0 {
            let principal = self.balance;
            self.balance = 0.0;
            self.payments_left = 0;
            return PeriodSplit {
                interest,
                principal,
            };
        }

        self.balance = next_balance;
        PeriodSplit {
            interest,
            principal,
        }
    }
}

pub fn compute_rent(inputs: &RentInputs) -> RentResult {
    let years = f64::from(inputs.horizon_years);

    let total_rent = if inputs.annual_increase_pct == 0.0 {
        inputs.monthly_rent * 12.0 * years
    } else {
        let growth = 1.0 + inputs.annual_increase_pct / 100.0;
        let mut total_rent = 0.0;
        let mut current_monthly_rent = inputs.monthly_rent;
        for _year in 1..=inputs.horizon_years {
            total_rent += current_monthly_rent * 12.0;
            current_monthly_rent *= growth;
        }
        total_rent
    };

    // Renters insurance is flat; it does not escalate with rent.
    let total_insurance = inputs.annual_insurance * years;

    RentResult {
        total_rent,
        total_insurance,
        total_cost: total_rent + total_insurance,
    }
}

pub fn compute_buy(inputs: &BuyInputs) -> Result<BuyResult, ModelError> {
    let resolved = inputs.resolve()?;
    let monthly_rate = inputs.monthly_rate();
    let n_payments = inputs.payment_count();
    let monthly_payment = level_payment(resolved.loan_principal, monthly_rate, n_payments);
    let years = f64::from(inputs.horizon_years);

    // Flat projection of the payment over the horizon, independent of payoff.
    let total_mortgage_paid = monthly_payment * 12.0 * years;

    let mut loan = Loan::new(
        resolved.loan_principal,
        monthly_rate,
        monthly_payment,
        n_payments,
    );
    for _ in 0..inputs.horizon_years.saturating_mul(MONTHS_PER_YEAR) {
        if loan.payments_left == 0 {
            break;
        }
        loan.step();
    }
    let remaining_loan_balance = loan.balance.max(0.0);

    let property_tax_total = inputs.annual_property_tax * years;
    let insurance_total = inputs.annual_insurance * years;
    let maintenance_total = resolved.annual_maintenance * years;

    let home_value_at_horizon = appreciated_value(inputs, years);
    let selling_cost = inputs.selling_cost_pct / 100.0 * home_value_at_horizon;
    let net_sale_proceeds = home_value_at_horizon - remaining_loan_balance - selling_cost;

    // Selling cost is added here and again subtracted inside net proceeds.
    let total_out_of_pocket = total_mortgage_paid
        + property_tax_total
        + insurance_total
        + maintenance_total
        + selling_cost
        - net_sale_proceeds;

    Ok(BuyResult {
        down_payment_amount: resolved.down_payment_amount,
        loan_principal: resolved.loan_principal,
        monthly_payment,
        total_mortgage_paid,
        property_tax_total,
        insurance_total,
        maintenance_total,
        home_value_at_horizon,
        selling_cost,
        remaining_loan_balance,
        net_sale_proceeds,
        total_out_of_pocket,
    })
}

pub fn compare(rent: &RentInputs, buy: &BuyInputs) -> Result<Comparison, ModelError> {
    if rent.horizon_years != buy.horizon_years {
        return Err(ModelError::invalid(format!(
            "rent horizon ({}) and buy horizon ({}) must match",
            rent.horizon_years, buy.horizon_years
        )));
    }

    let rent_result = compute_rent(rent);
    let buy_result = compute_buy(buy)?;

    Ok(Comparison {
        horizon_years: rent.horizon_years,
        cheaper: Cheaper::between(rent_result.total_cost, buy_result.total_out_of_pocket),
        cost_difference: (rent_result.total_cost - buy_result.total_out_of_pocket).abs(),
        rent: rent_result,
        buy: buy_result,
    })
}

/// Re-runs the comparison for every horizon from one year up to `max_horizon_years`.
pub fn run_horizon_sweep(
    rent: &RentInputs,
    buy: &BuyInputs,
    max_horizon_years: u32,
) -> Result<HorizonSweep, ModelError> {
    if max_horizon_years == 0 {
        return Err(ModelError::invalid("maxHorizonYears must be > 0"));
    }
    if max_horizon_years > MAX_TABULATED_YEARS {
        return Err(ModelError::invalid(format!(
            "maxHorizonYears must be <= {MAX_TABULATED_YEARS}"
        )));
    }

    let mut horizons = Vec::new();
    for horizon_years in 1..=max_horizon_years {
        let comparison = compare(
            &RentInputs {
                horizon_years,
                ..*rent
            },
            &BuyInputs {
                horizon_years,
                ..*buy
            },
        )?;
        horizons.push(HorizonResult {
            horizon_years,
            rent_total_cost: comparison.rent.total_cost,
            buy_total_out_of_pocket: comparison.buy.total_out_of_pocket,
            cheaper: comparison.cheaper,
        });
    }

    let break_even_years = horizons
        .iter()
        .find(|h| h.cheaper == Cheaper::Buy)
        .map(|h| h.horizon_years);

    Ok(HorizonSweep {
        horizons,
        break_even_years,
    })
}

/// Year-by-year amortization over the buyer's horizon.
pub fn run_yearly_schedule(inputs: &BuyInputs) -> Result<Vec<ScheduleYear>, ModelError> {
    if inputs.horizon_years > MAX_TABULATED_YEARS {
        return Err(ModelError::invalid(format!(
            "horizonYears must be <= {MAX_TABULATED_YEARS} for a yearly schedule"
        )));
    }
    let resolved = inputs.resolve()?;
    let monthly_rate = inputs.monthly_rate();
    let n_payments = inputs.payment_count();
    let monthly_payment = level_payment(resolved.loan_principal, monthly_rate, n_payments);

    let mut loan = Loan::new(
        resolved.loan_principal,
        monthly_rate,
        monthly_payment,
        n_payments,
    );
    let mut years = Vec::new();
    for year in 1..=inputs.horizon_years {
        let mut interest_paid = 0.0;
        let mut principal_paid = 0.0;
        for _ in 0..MONTHS_PER_YEAR {
            let split = loan.step();
            interest_paid += split.interest;
            principal_paid += split.principal;
        }

        let ending_balance = loan.balance.max(0.0);
        let home_value = appreciated_value(inputs, f64::from(year));
        years.push(ScheduleYear {
            year,
            interest_paid,
            principal_paid,
            ending_balance,
            home_value,
            equity: home_value - ending_balance,
        });
    }
    Ok(years)
}

fn level_payment(principal: f64, monthly_rate: f64, n_payments: u32) -> f64 {
    let n = f64::from(n_payments);
    if monthly_rate == 0.0 {
        return principal / n;
    }

    let growth = (1.0 + monthly_rate).powf(n);
    if growth == 1.0 {
        // Rate too small to register over the term: straight-line repayment.
        return principal / n;
    }
    principal * (monthly_rate * growth) / (growth - 1.0)
}

fn appreciated_value(inputs: &BuyInputs, years: f64) -> f64 {
    inputs.price * (1.0 + inputs.annual_appreciation_pct / 100.0).powf(years)
}
