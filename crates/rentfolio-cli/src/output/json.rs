use serde_json::Value;

/// Print the result envelope as JSON.
///
/// A terminal gets indented output; a pipe or file gets one compact line
/// per run so results can be appended and streamed through `jq`.
pub fn print_json(value: &Value) {
    let pretty = atty::is(atty::Stream::Stdout);
    match render(value, pretty) {
        Ok(s) => println!("{s}"),
        Err(e) => tracing::error!(error = %e, "JSON serialization failed"),
    }
}

fn render(value: &Value, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
