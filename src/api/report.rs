use std::fmt::Write;

use super::CompareResponse;
use crate::core::{Cheaper, HorizonResult, ScheduleYear};

pub(super) fn render(response: &CompareResponse) -> String {
    let mut out = String::new();
    let rent = &response.rent;
    let buy = &response.buy;

    let _ = writeln!(
        out,
        "{} is likely cheaper over {} {} based on your inputs.",
        verdict(response.cheaper),
        response.horizon_years,
        plural_years(response.horizon_years)
    );
    line(&mut out, "Difference", response.cost_difference);
    match response.break_even_years {
        Some(years) => {
            let _ = writeln!(
                out,
                "Buying first comes out ahead at {years} {}.",
                plural_years(years)
            );
        }
        None => {
            let _ = writeln!(out, "Buying never comes out ahead in the tested range.");
        }
    }

    let _ = writeln!(out, "\nRent summary");
    line(&mut out, "Total rent paid", rent.total_rent);
    line(&mut out, "Total renters insurance", rent.total_insurance);
    line(&mut out, "Total cost of renting", rent.total_cost);

    let _ = writeln!(out, "\nBuy summary");
    line(&mut out, "Down payment", buy.down_payment_amount);
    line(&mut out, "Loan amount", buy.loan_principal);
    line(&mut out, "Monthly mortgage payment", buy.monthly_payment);
    line(&mut out, "Total mortgage payments", buy.total_mortgage_paid);
    line(&mut out, "Property taxes", buy.property_tax_total);
    line(&mut out, "Home insurance", buy.insurance_total);
    line(&mut out, "Maintenance cost", buy.maintenance_total);
    line(&mut out, "Home value at sale", buy.home_value_at_horizon);
    line(&mut out, "Remaining loan balance", buy.remaining_loan_balance);
    line(&mut out, "Selling cost", buy.selling_cost);
    line(&mut out, "Net proceeds from sale", buy.net_sale_proceeds);
    line(&mut out, "Total out-of-pocket cost of buying", buy.total_out_of_pocket);

    schedule_table(&mut out, &response.schedule);
    horizon_table(&mut out, &response.horizons);
    out
}

fn verdict(cheaper: Cheaper) -> &'static str {
    match cheaper {
        Cheaper::Rent => "Renting",
        Cheaper::Buy => "Buying",
    }
}

fn schedule_table(out: &mut String, schedule: &[ScheduleYear]) {
    let _ = writeln!(out, "\nMortgage by year");
    let _ = writeln!(
        out,
        "  {:>4}{:>14}{:>14}{:>14}{:>14}{:>14}",
        "Year", "Interest", "Principal", "Balance", "Home value", "Equity"
    );
    for row in schedule {
        let _ = writeln!(
            out,
            "  {:>4}{:>14}{:>14}{:>14}{:>14}{:>14}",
            row.year,
            format_currency(row.interest_paid),
            format_currency(row.principal_paid),
            format_currency(row.ending_balance),
            format_currency(row.home_value),
            format_currency(row.equity)
        );
    }
}

fn horizon_table(out: &mut String, horizons: &[HorizonResult]) {
    let _ = writeln!(out, "\nCost if you leave after");
    let _ = writeln!(
        out,
        "  {:>5}{:>14}{:>14}  {}",
        "Years", "Rent", "Buy", "Cheaper"
    );
    for row in horizons {
        let _ = writeln!(
            out,
            "  {:>5}{:>14}{:>14}  {}",
            row.horizon_years,
            format_currency(row.rent_total_cost),
            format_currency(row.buy_total_out_of_pocket),
            verdict(row.cheaper)
        );
    }
}

fn line(out: &mut String, label: &str, amount: f64) {
    let _ = writeln!(out, "  {label:<36}{:>14}", format_currency(amount));
}

fn plural_years(years: u32) -> &'static str {
    if years == 1 { "year" } else { "years" }
}

/// Whole dollars with thousands separators, e.g. `-$1,234`.
pub(super) fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${amount}");
    }

    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{build_inputs, default_cli_for_api, run_comparison};

    #[test]
    fn currency_groups_thousands_and_rounds() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1_000.0), "$1,000");
        assert_eq!(format_currency(231_273.865), "$231,274");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567");
        assert_eq!(format_currency(-6_937.96), "-$6,938");
        assert_eq!(format_currency(-0.2), "$0");
    }

    #[test]
    fn report_lists_every_result_field_schedule_and_horizons() {
        let request = build_inputs(&default_cli_for_api()).expect("valid inputs");
        let response = run_comparison(&request).expect("comparison runs");
        let text = render(&response);

        assert!(text.starts_with("Buying is likely cheaper over 7 years"));
        assert!(text.contains("at 1 year."));
        for label in [
            "Total rent paid",
            "Total renters insurance",
            "Total cost of renting",
            "Down payment",
            "Loan amount",
            "Monthly mortgage payment",
            "Total mortgage payments",
            "Property taxes",
            "Home insurance",
            "Maintenance cost",
            "Home value at sale",
            "Remaining loan balance",
            "Selling cost",
            "Net proceeds from sale",
            "Total out-of-pocket cost of buying",
        ] {
            assert!(text.contains(label), "missing {label}");
        }
        assert!(text.contains("$231,274"));
        assert!(text.contains("$148,733"));
        assert!(text.contains("$480,000"));
        assert!(text.contains("$737,924"));

        let schedule_rows = text
            .split("Mortgage by year")
            .nth(1)
            .and_then(|rest| rest.split("Cost if you leave after").next())
            .expect("schedule section")
            .lines()
            .filter(|l| l.trim_start().starts_with(char::is_numeric))
            .count();
        assert_eq!(schedule_rows, response.schedule.len());

        let horizon_rows = text
            .split("Cost if you leave after")
            .nth(1)
            .expect("horizon section")
            .lines()
            .filter(|l| l.trim_start().starts_with(char::is_numeric))
            .count();
        assert_eq!(horizon_rows, response.horizons.len());
    }
}
