use clap::{Args, ValueEnum};
use serde_json::Value;

use rentfolio_core::rent_roll::{self, LeaseFilter, RentRollInput};

use crate::input;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FilterArg {
    #[default]
    All,
    Paid,
    Overdue,
    Expiring,
}

impl From<FilterArg> for LeaseFilter {
    fn from(f: FilterArg) -> Self {
        match f {
            FilterArg::All => LeaseFilter::All,
            FilterArg::Paid => LeaseFilter::Paid,
            FilterArg::Overdue => LeaseFilter::Overdue,
            FilterArg::Expiring => LeaseFilter::Expiring,
        }
    }
}

/// Arguments for the rent roll
#[derive(Args)]
pub struct RentRollArgs {
    /// Path to JSON/YAML file with leases, payments and expenses
    #[arg(long)]
    pub input: Option<String>,

    /// Only list leases with this collection status
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    pub filter: FilterArg,
}

pub fn run_rent_roll(args: RentRollArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let roll_input: RentRollInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for rent roll".into());
    };

    let mut result = rent_roll::build_rent_roll(&roll_input)?;

    let filter = LeaseFilter::from(args.filter);
    if filter != LeaseFilter::All {
        result.result.leases = rent_roll::filter_leases(&result.result.leases, filter)
            .into_iter()
            .cloned()
            .collect();
    }

    Ok(serde_json::to_value(result)?)
}
