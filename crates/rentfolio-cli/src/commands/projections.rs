use chrono::Datelike;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rentfolio_core::projections::{self, IncomeSafetyInput, WealthBuildInput};

use crate::input;

/// Arguments for the rent growth projection
#[derive(Args)]
pub struct RentProjectionArgs {
    /// Current monthly rent
    #[arg(long)]
    pub current_rent: Decimal,

    /// Annual rent growth, percent
    #[arg(long, default_value = "3", allow_hyphen_values = true)]
    pub growth_rate: Decimal,

    /// First year on the chart (defaults to the current year)
    #[arg(long)]
    pub start_year: Option<i32>,
}

pub fn run_rent_projection(args: RentProjectionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start_year = args
        .start_year
        .unwrap_or_else(|| chrono::Local::now().year());
    let points = projections::rent_projection(args.current_rent, args.growth_rate, start_year);
    Ok(serde_json::to_value(points)?)
}

/// Arguments for the income and safety margin projection
#[derive(Args)]
pub struct IncomeSafetyArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Current monthly rent
    #[arg(long)]
    pub current_rent: Option<Decimal>,

    /// Annual rent growth, percent
    #[arg(long, default_value = "3", allow_hyphen_values = true)]
    pub rent_growth_rate: Decimal,

    /// Current monthly OPEX
    #[arg(long)]
    pub opex: Option<Decimal>,

    /// Annual OPEX inflation, percent
    #[arg(long, default_value = "2.5", allow_hyphen_values = true)]
    pub opex_inflation_rate: Decimal,

    /// Monthly debt service
    #[arg(long, default_value = "0")]
    pub debt_service: Decimal,
}

pub fn run_income_safety(args: IncomeSafetyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let safety_input: IncomeSafetyInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let rent = args
            .current_rent
            .ok_or("--current-rent is required (or provide --input)")?;
        let opex = args.opex.ok_or("--opex is required (or provide --input)")?;

        IncomeSafetyInput {
            current_rent: rent,
            rent_growth_rate: args.rent_growth_rate,
            opex,
            opex_inflation_rate: args.opex_inflation_rate,
            debt_service: args.debt_service,
        }
    };

    let result = projections::income_and_safety(&safety_input);
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the equity build-up projection
#[derive(Args)]
pub struct WealthBuildArgs {
    /// Path to JSON/YAML input file with NOI, cap rate and mortgages
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_wealth_build(args: WealthBuildArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let wealth_input: WealthBuildInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for wealth build".into());
    };

    let result = projections::wealth_build(&wealth_input)?;
    Ok(serde_json::to_value(result)?)
}
