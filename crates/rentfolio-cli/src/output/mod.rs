pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use colored::Colorize;
use serde_json::Value;

/// Write a command's result envelope in the chosen format.
///
/// CSV and minimal output carry only the result, so any calculation
/// warnings go to stderr where they stay out of piped data. JSON keeps
/// them in the envelope and tables print their own section.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => {
            csv_out::print_csv(value);
            report_warnings(value);
        }
        OutputFormat::Minimal => {
            minimal::print_minimal(value);
            report_warnings(value);
        }
    }
}

fn report_warnings(value: &Value) {
    for warning in envelope_warnings(value) {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }
}

/// The `warnings` strings of a result envelope; empty for bare values.
fn envelope_warnings(value: &Value) -> Vec<&str> {
    value
        .get("warnings")
        .and_then(Value::as_array)
        .map(|ws| ws.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_warnings_read_strings() {
        let v = json!({
            "result": {"total": "560"},
            "warnings": ["Cap rate not positive", 7, "Net cash flow of -20 is negative"],
        });
        assert_eq!(
            envelope_warnings(&v),
            vec!["Cap rate not positive", "Net cash flow of -20 is negative"]
        );
    }

    #[test]
    fn test_envelope_warnings_absent() {
        assert!(envelope_warnings(&json!({"result": []})).is_empty());
        assert!(envelope_warnings(&json!([{"year": 2025, "rent": "2000"}])).is_empty());
        assert!(envelope_warnings(&json!("560")).is_empty());
    }
}
