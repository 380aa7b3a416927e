use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use rentfolio_core::opex::{self, OpexContext, PropertyLike};

use crate::input;

/// Property and context read from `--input` or stdin.
#[derive(Debug, Deserialize)]
struct OpexRequest {
    #[serde(default)]
    property: PropertyLike,
    #[serde(default, alias = "ctx")]
    context: OpexContext,
}

/// Arguments for monthly OPEX
#[derive(Args)]
pub struct OpexArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly rent the percentage lines are taken of
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Management fee, percent of rent
    #[arg(long)]
    pub mgmt_pct: Option<Decimal>,

    /// Maintenance allowance, percent of rent
    #[arg(long)]
    pub maintenance_pct: Option<Decimal>,

    /// Monthly property tax
    #[arg(long)]
    pub property_taxes: Option<Decimal>,

    /// Monthly hazard insurance
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Property tax is paid through the mortgage
    #[arg(long)]
    pub taxes_in_mortgage: bool,

    /// Insurance is paid through the mortgage
    #[arg(long)]
    pub insurance_in_mortgage: bool,

    /// Mortgage payment includes escrow for taxes and insurance
    #[arg(long)]
    pub escrow: bool,
}

pub fn run_opex(args: OpexArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: OpexRequest = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let rent = args
            .monthly_rent
            .ok_or("--monthly-rent is required (or provide --input)")?;

        OpexRequest {
            property: PropertyLike {
                mgmt_pct: args.mgmt_pct,
                maintenance_pct: args.maintenance_pct,
                property_taxes: args.property_taxes,
                taxes_in_mortgage: args.taxes_in_mortgage,
                insurance: args.insurance,
                insurance_in_mortgage: args.insurance_in_mortgage,
                ..Default::default()
            },
            context: OpexContext::new(rent).with_escrow(args.escrow),
        }
    };

    let breakdown = opex::opex_breakdown(&request.property, &request.context);
    Ok(serde_json::to_value(breakdown)?)
}

/// Arguments for the automatic property tax estimate
#[derive(Args)]
pub struct TaxEstimateArgs {
    /// Purchase or sale price
    #[arg(long, allow_hyphen_values = true)]
    pub sale_price: Decimal,
}

pub fn run_tax_estimate(args: TaxEstimateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let annual = opex::estimate_property_taxes(Some(args.sale_price))
        .ok_or("--sale-price must be greater than zero")?;

    Ok(json!({
        "sale_price": args.sale_price,
        "rate": opex::AUTO_TAX_RATE,
        "estimated_property_taxes": annual,
    }))
}
