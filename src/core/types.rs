use serde::Serialize;

use super::error::ModelError;

/// How the buyer states the down payment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DownPayment {
    Amount(f64),
    PercentOfPrice(f64),
}

/// How the buyer states yearly upkeep.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Maintenance {
    AnnualAmount(f64),
    /// Percent of the purchase price spent each year.
    PercentOfPrice(f64),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cheaper {
    Rent,
    Buy,
}

impl Cheaper {
    /// Renting wins only when strictly cheaper; ties and NaN totals go to buying.
    pub fn between(rent_total: f64, buy_total: f64) -> Self {
        if rent_total < buy_total {
            Cheaper::Rent
        } else {
            Cheaper::Buy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentInputs {
    pub monthly_rent: f64,
    pub annual_increase_pct: f64,
    pub annual_insurance: f64,
    pub horizon_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentResult {
    pub total_rent: f64,
    pub total_insurance: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuyInputs {
    pub price: f64,
    pub down_payment: DownPayment,
    pub annual_rate_pct: f64,
    pub loan_term_years: u32,
    pub annual_property_tax: f64,
    pub annual_insurance: f64,
    pub maintenance: Maintenance,
    pub annual_appreciation_pct: f64,
    pub horizon_years: u32,
    pub selling_cost_pct: f64,
}

/// Down payment and maintenance resolved to currency amounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPurchase {
    pub down_payment_amount: f64,
    pub loan_principal: f64,
    pub annual_maintenance: f64,
}

impl BuyInputs {
    /// Turns the down payment and maintenance variants into currency amounts.
    ///
    /// The loan principal is `price - down_payment_amount`, floored at zero: a
    /// down payment larger than the price yields no loan (zero payment, zero
    /// balance) rather than a negative principal and payment. Fails with
    /// [`ModelError::InvalidArgument`] when `loan_term_years` is zero.
    pub fn resolve(&self) -> Result<ResolvedPurchase, ModelError> {
        if self.loan_term_years == 0 {
            return Err(ModelError::invalid("loanTermYears must be > 0"));
        }

        let down_payment_amount = match self.down_payment {
            DownPayment::Amount(amount) => amount,
            DownPayment::PercentOfPrice(pct) => self.price * pct / 100.0,
        };
        let annual_maintenance = match self.maintenance {
            Maintenance::AnnualAmount(amount) => amount,
            Maintenance::PercentOfPrice(pct) => pct / 100.0 * self.price,
        };

        let loan_principal = (self.price - down_payment_amount).max(0.0);

        Ok(ResolvedPurchase {
            down_payment_amount,
            loan_principal,
            annual_maintenance,
        })
    }

    pub fn payment_count(&self) -> u32 {
        self.loan_term_years.saturating_mul(12)
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_pct / 100.0 / 12.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyResult {
    pub down_payment_amount: f64,
    pub loan_principal: f64,
    pub monthly_payment: f64,
    pub total_mortgage_paid: f64,
    pub property_tax_total: f64,
    pub insurance_total: f64,
    pub maintenance_total: f64,
    pub home_value_at_horizon: f64,
    pub selling_cost: f64,
    pub remaining_loan_balance: f64,
    pub net_sale_proceeds: f64,
    pub total_out_of_pocket: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub horizon_years: u32,
    pub cheaper: Cheaper,
    pub cost_difference: f64,
    pub rent: RentResult,
    pub buy: BuyResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizonResult {
    pub horizon_years: u32,
    pub rent_total_cost: f64,
    pub buy_total_out_of_pocket: f64,
    pub cheaper: Cheaper,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HorizonSweep {
    pub horizons: Vec<HorizonResult>,
    /// First horizon at which buying comes out cheaper.
    pub break_even_years: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleYear {
    pub year: u32,
    pub interest_paid: f64,
    pub principal_paid: f64,
    pub ending_balance: f64,
    pub home_value: f64,
    pub equity: f64,
}
