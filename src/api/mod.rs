use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    BuyInputs, BuyResult, Cheaper, Comparison, DownPayment, HorizonResult, Maintenance,
    RentInputs, RentResult, ScheduleYear, compare, run_horizon_sweep, run_yearly_schedule,
};

mod report;

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const MAX_HORIZON_YEARS: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    monthly_rent: Option<f64>,
    rent_increase: Option<f64>,
    rent_insurance: Option<f64>,

    price: Option<f64>,
    down_payment: Option<f64>,
    down_payment_pct: Option<f64>,
    mortgage_rate: Option<f64>,
    loan_term: Option<u32>,
    property_tax: Option<f64>,
    home_insurance: Option<f64>,
    maintenance_pct: Option<f64>,
    maintenance_amount: Option<f64>,
    appreciation: Option<f64>,
    selling_cost_pct: Option<f64>,

    years: Option<u32>,
    max_years: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "rentbuy",
    about = "Rent vs buy cost comparison over a fixed horizon",
    after_help = "Run `rentbuy serve [port]` to start the HTTP API and web form."
)]
struct Cli {
    #[arg(long, default_value_t = 2500.0, help = "Monthly rent")]
    monthly_rent: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Expected yearly rent increase in percent"
    )]
    rent_increase: f64,
    #[arg(long, default_value_t = 200.0, help = "Renters insurance per year")]
    rent_insurance: f64,

    #[arg(long, default_value_t = 600000.0, help = "Home price")]
    price: f64,
    #[arg(
        long,
        conflicts_with = "down_payment_pct",
        help = "Down payment as an amount"
    )]
    down_payment: Option<f64>,
    #[arg(long, help = "Down payment as percent of the home price")]
    down_payment_pct: Option<f64>,
    #[arg(long, default_value_t = 6.5, help = "Mortgage rate in percent per year")]
    mortgage_rate: f64,
    #[arg(long, default_value_t = 30, help = "Loan term in years")]
    loan_term: u32,
    #[arg(long, default_value_t = 6000.0, help = "Property tax per year")]
    property_tax: f64,
    #[arg(long, default_value_t = 1500.0, help = "Homeowners insurance per year")]
    home_insurance: f64,
    #[arg(
        long,
        conflicts_with = "maintenance_amount",
        help = "Yearly maintenance as percent of the home price"
    )]
    maintenance_pct: Option<f64>,
    #[arg(long, help = "Yearly maintenance as an amount")]
    maintenance_amount: Option<f64>,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Expected yearly home appreciation in percent"
    )]
    appreciation: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Selling cost as percent of the final home price"
    )]
    selling_cost_pct: f64,

    #[arg(long, default_value_t = 7, help = "Years you plan to stay")]
    years: u32,
    #[arg(
        long,
        default_value_t = 30,
        help = "Longest horizon to test when searching for the break-even year"
    )]
    max_years: u32,
    #[arg(long, help = "Print the comparison as JSON")]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
struct CompareRequest {
    rent: RentInputs,
    buy: BuyInputs,
    max_horizon_years: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    horizon_years: u32,
    cheaper: Cheaper,
    cost_difference: f64,
    rent: RentResult,
    buy: BuyResult,
    break_even_years: Option<u32>,
    horizons: Vec<HorizonResult>,
    schedule: Vec<ScheduleYear>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: &Cli) -> Result<CompareRequest, String> {
    if cli.years == 0 {
        return Err("--years must be > 0".to_string());
    }

    if cli.years > MAX_HORIZON_YEARS {
        return Err(format!("--years must be <= {MAX_HORIZON_YEARS}"));
    }

    if cli.max_years == 0 || cli.max_years > MAX_HORIZON_YEARS {
        return Err(format!("--max-years must be between 1 and {MAX_HORIZON_YEARS}"));
    }

    if cli.loan_term == 0 {
        return Err("--loan-term must be > 0".to_string());
    }

    if cli.loan_term > MAX_HORIZON_YEARS {
        return Err(format!("--loan-term must be <= {MAX_HORIZON_YEARS}"));
    }

    for (name, amount) in [
        ("--monthly-rent", cli.monthly_rent),
        ("--rent-insurance", cli.rent_insurance),
        ("--price", cli.price),
        ("--property-tax", cli.property_tax),
        ("--home-insurance", cli.home_insurance),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    for (name, rate) in [
        ("--rent-increase", cli.rent_increase),
        ("--appreciation", cli.appreciation),
    ] {
        if !rate.is_finite() || rate <= -100.0 {
            return Err(format!("{name} must be > -100"));
        }
    }

    if !cli.mortgage_rate.is_finite() || cli.mortgage_rate < 0.0 {
        return Err("--mortgage-rate must be >= 0".to_string());
    }

    if !(0.0..=100.0).contains(&cli.selling_cost_pct) {
        return Err("--selling-cost-pct must be between 0 and 100".to_string());
    }

    let down_payment = match (cli.down_payment, cli.down_payment_pct) {
        (Some(_), Some(_)) => {
            return Err(
                "--down-payment and --down-payment-pct cannot be used together".to_string(),
            );
        }
        (Some(amount), None) => {
            if !amount.is_finite() || amount < 0.0 {
                return Err("--down-payment must be >= 0".to_string());
            }
            if amount > cli.price {
                return Err("--down-payment cannot exceed --price".to_string());
            }
            DownPayment::Amount(amount)
        }
        (None, Some(pct)) => {
            if !(0.0..=100.0).contains(&pct) {
                return Err("--down-payment-pct must be between 0 and 100".to_string());
            }
            DownPayment::PercentOfPrice(pct)
        }
        (None, None) => DownPayment::Amount(0.0),
    };

    let maintenance = match (cli.maintenance_amount, cli.maintenance_pct) {
        (Some(_), Some(_)) => {
            return Err(
                "--maintenance-amount and --maintenance-pct cannot be used together".to_string(),
            );
        }
        (Some(amount), None) => {
            if !amount.is_finite() || amount < 0.0 {
                return Err("--maintenance-amount must be >= 0".to_string());
            }
            Maintenance::AnnualAmount(amount)
        }
        (None, Some(pct)) => {
            if !(0.0..=100.0).contains(&pct) {
                return Err("--maintenance-pct must be between 0 and 100".to_string());
            }
            Maintenance::PercentOfPrice(pct)
        }
        (None, None) => Maintenance::PercentOfPrice(0.0),
    };

    Ok(CompareRequest {
        rent: RentInputs {
            monthly_rent: cli.monthly_rent,
            annual_increase_pct: cli.rent_increase,
            annual_insurance: cli.rent_insurance,
            horizon_years: cli.years,
        },
        buy: BuyInputs {
            price: cli.price,
            down_payment,
            annual_rate_pct: cli.mortgage_rate,
            loan_term_years: cli.loan_term,
            annual_property_tax: cli.property_tax,
            annual_insurance: cli.home_insurance,
            maintenance,
            annual_appreciation_pct: cli.appreciation,
            horizon_years: cli.years,
            selling_cost_pct: cli.selling_cost_pct,
        },
        max_horizon_years: cli.max_years,
    })
}

fn run_comparison(request: &CompareRequest) -> Result<CompareResponse, String> {
    let comparison = compare(&request.rent, &request.buy).map_err(|e| e.to_string())?;
    let sweep = run_horizon_sweep(&request.rent, &request.buy, request.max_horizon_years)
        .map_err(|e| e.to_string())?;
    let schedule = run_yearly_schedule(&request.buy).map_err(|e| e.to_string())?;
    Ok(build_compare_response(
        comparison,
        sweep.break_even_years,
        sweep.horizons,
        schedule,
    ))
}

fn build_compare_response(
    comparison: Comparison,
    break_even_years: Option<u32>,
    horizons: Vec<HorizonResult>,
    schedule: Vec<ScheduleYear>,
) -> CompareResponse {
    CompareResponse {
        horizon_years: comparison.horizon_years,
        cheaper: comparison.cheaper,
        cost_difference: comparison.cost_difference,
        rent: comparison.rent,
        buy: comparison.buy,
        break_even_years,
        horizons,
        schedule,
    }
}

/// Parses command-line flags, runs one comparison and prints it.
pub fn run_cli<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| e.exit());
    let request = build_inputs(&cli)?;
    debug!(
        years = request.rent.horizon_years,
        max_years = request.max_horizon_years,
        "running comparison"
    );
    let response = run_comparison(&request)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("Failed to serialize comparison: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", report::render(&response));
    }
    Ok(())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router();

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "rent-vs-buy HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler)
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_get_handler(
    payload: Result<Query<ComparePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => compare_handler_impl(payload).await,
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

async fn compare_post_handler(
    payload: Result<Json<ComparePayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => compare_handler_impl(payload).await,
        Err(rejection) => rejected_payload(&rejection.body_text()),
    }
}

fn rejected_payload(detail: &str) -> Response {
    let msg = format!("Invalid API payload: {detail}");
    warn!(error = %msg, "rejected compare request");
    error_response(StatusCode::BAD_REQUEST, &msg)
}

async fn compare_handler_impl(payload: ComparePayload) -> Response {
    let request = match request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!(error = %msg, "rejected compare request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    debug!(
        years = request.rent.horizon_years,
        price = request.buy.price,
        "compare request"
    );

    match run_comparison(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            warn!(error = %msg, "comparison failed");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn request_from_json(json: &str) -> Result<CompareRequest, String> {
    let payload = serde_json::from_str::<ComparePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    request_from_payload(payload)
}

fn request_from_payload(payload: ComparePayload) -> Result<CompareRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.monthly_rent {
        cli.monthly_rent = v;
    }
    if let Some(v) = payload.rent_increase {
        cli.rent_increase = v;
    }
    if let Some(v) = payload.rent_insurance {
        cli.rent_insurance = v;
    }

    if let Some(v) = payload.price {
        cli.price = v;
    }
    if payload.down_payment.is_some() || payload.down_payment_pct.is_some() {
        cli.down_payment = payload.down_payment;
        cli.down_payment_pct = payload.down_payment_pct;
    }
    if let Some(v) = payload.mortgage_rate {
        cli.mortgage_rate = v;
    }
    if let Some(v) = payload.loan_term {
        cli.loan_term = v;
    }
    if let Some(v) = payload.property_tax {
        cli.property_tax = v;
    }
    if let Some(v) = payload.home_insurance {
        cli.home_insurance = v;
    }
    if payload.maintenance_pct.is_some() || payload.maintenance_amount.is_some() {
        cli.maintenance_pct = payload.maintenance_pct;
        cli.maintenance_amount = payload.maintenance_amount;
    }
    if let Some(v) = payload.appreciation {
        cli.appreciation = v;
    }
    if let Some(v) = payload.selling_cost_pct {
        cli.selling_cost_pct = v;
    }

    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.max_years {
        cli.max_years = v;
    }

    build_inputs(&cli).map_err(|msg| msg.replace("--", ""))
}

fn default_cli_for_api() -> Cli {
    Cli {
        monthly_rent: 2_500.0,
        rent_increase: 3.0,
        rent_insurance: 200.0,
        price: 600_000.0,
        down_payment: None,
        down_payment_pct: Some(20.0),
        mortgage_rate: 6.5,
        loan_term: 30,
        property_tax: 6_000.0,
        home_insurance: 1_500.0,
        maintenance_pct: Some(1.0),
        maintenance_amount: None,
        appreciation: 3.0,
        selling_cost_pct: 7.0,
        years: 7,
        max_years: 30,
        json: false,
    }
}
