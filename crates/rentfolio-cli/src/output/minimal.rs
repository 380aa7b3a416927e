use serde_json::{Map, Value};

/// Headline fields, most specific first.
const PRIORITY_KEYS: [&str; 7] = [
    "total",
    "irr_10_year",
    "estimated_property_taxes",
    "computed_payment",
    "guidance_text",
    "net_cash_flow",
    "noi",
];

/// Objects searched when the result itself has no headline field.
const NESTED_KEYS: [&str; 2] = ["metrics", "summary"];

/// Print just the key answer value from the output.
///
/// Looks for a headline field in the result, then in its `metrics` /
/// `summary` objects. Series results print their final point.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Object(map) => {
            if let Some(val) = find_headline(map) {
                println!("{}", format_minimal(val));
                return;
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_minimal(val));
            }
        }
        Value::Array(points) => match points.last() {
            Some(Value::Object(last)) => {
                let line: Vec<String> = last
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, format_minimal(v)))
                    .collect();
                println!("{}", line.join(" "));
            }
            Some(other) => println!("{}", format_minimal(other)),
            None => println!("(empty)"),
        },
        other => println!("{}", format_minimal(other)),
    }
}

fn find_headline(map: &Map<String, Value>) -> Option<&Value> {
    let direct = PRIORITY_KEYS
        .iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null());
    if direct.is_some() {
        return direct;
    }

    NESTED_KEYS
        .iter()
        .filter_map(|k| map.get(*k).and_then(Value::as_object))
        .find_map(find_headline)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headline_prefers_direct_field() {
        let v = json!({"taxes": "200", "total": "560"});
        assert_eq!(find_headline(v.as_object().unwrap()), Some(&json!("560")));
    }

    #[test]
    fn test_headline_descends_into_metrics() {
        let v = json!({"leases": [], "metrics": {"mrr": "3250", "net_cash_flow": "384"}});
        assert_eq!(find_headline(v.as_object().unwrap()), Some(&json!("384")));
    }

    #[test]
    fn test_headline_missing() {
        let v = json!({"rent": "2000"});
        assert_eq!(find_headline(v.as_object().unwrap()), None);
    }
}
