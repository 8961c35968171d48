mod engine;
mod error;
mod types;

pub use engine::{
    MAX_TABULATED_YEARS, compare, compute_buy, compute_rent, run_horizon_sweep,
    run_yearly_schedule,
};
pub use error::ModelError;
pub use types::{
    BuyInputs, BuyResult, Cheaper, Comparison, DownPayment, HorizonResult, HorizonSweep,
    Maintenance, RentInputs, RentResult, ResolvedPurchase, ScheduleYear,
};
