use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rentfolio_core::mortgage::{self, MortgageRecord};

use crate::input;

/// Arguments for loan amortisation
#[derive(Args)]
pub struct MortgageArgs {
    /// Path to JSON/YAML mortgage record (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Original loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate, percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long, default_value_t = 360)]
    pub term_months: u32,

    /// Monthly payment as recorded (defaults to the computed payment)
    #[arg(long)]
    pub monthly_payment: Option<Decimal>,
}

pub fn run_mortgage(args: MortgageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: MortgageRecord = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let principal = args
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = args.rate.ok_or("--rate is required (or provide --input)")?;

        let monthly_payment = match args.monthly_payment {
            Some(p) => p,
            None => mortgage::amortizing_payment(principal, rate, args.term_months)?
                .round_dp(2),
        };

        MortgageRecord {
            loan_name: None,
            principal,
            interest_rate: rate,
            term_months: args.term_months,
            monthly_payment,
            start_date: None,
        }
    };

    let result = mortgage::amortization_summary(&record)?;
    Ok(serde_json::to_value(result)?)
}
