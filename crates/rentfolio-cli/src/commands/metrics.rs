use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use rentfolio_core::metrics::{self, MetricsParams};
use rentfolio_core::opex::{OpexContext, PropertyLike};

use crate::input;

/// Arguments for the property KPI report
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly rent collected
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Current property value
    #[arg(long)]
    pub property_value: Option<Decimal>,

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

    /// Annual debt service
    #[arg(long)]
    pub debt_service_annual: Option<Decimal>,

    /// Equity invested (down payment plus closing costs)
    #[arg(long)]
    pub invested_equity: Option<Decimal>,

    /// Mortgage payment includes escrow for taxes and insurance
    #[arg(long)]
    pub escrow: bool,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: MetricsParams = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let rent = args
            .monthly_rent
            .ok_or("--monthly-rent is required (or provide --input)")?;
        let value = args
            .property_value
            .ok_or("--property-value is required (or provide --input)")?;

        MetricsParams {
            monthly_rent: rent,
            property: PropertyLike {
                mgmt_pct: args.mgmt_pct,
                maintenance_pct: args.maintenance_pct,
                property_taxes: args.property_taxes,
                insurance: args.insurance,
                ..Default::default()
            },
            context: OpexContext::new(rent).with_escrow(args.escrow),
            property_value: value,
            debt_service_annual: args.debt_service_annual,
            invested_equity: args.invested_equity,
        }
    };

    let result = metrics::analyze_property(&params);
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the 10-year IRR approximation
#[derive(Args)]
pub struct IrrArgs {
    /// Current property value
    #[arg(long)]
    pub property_value: Decimal,

    /// Annual cash flow (NOI on the dashboard)
    #[arg(long, allow_hyphen_values = true)]
    pub cash_flow: Decimal,

    /// Equity invested
    #[arg(long)]
    pub invested_equity: Decimal,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let irr = metrics::irr_10_year(args.property_value, args.cash_flow, args.invested_equity);

    Ok(json!({
        "irr_10_year": irr,
        "horizon_years": metrics::IRR_HORIZON_YEARS,
        "appreciation": metrics::IRR_APPRECIATION,
    }))
}
