use serde_json::Value;

/// Render a transaction result for the terminal.
///
/// JSON is pretty-printed one field per line; anything else is shown as
/// (lossy) UTF-8.
pub fn render(result: &[u8]) -> String {
    if result.is_empty() {
        return String::new();
    }
    match serde_json::from_slice::<Value>(result) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(result).into_owned()),
        Err(_) => String::from_utf8_lossy(result).into_owned(),
    }
}

/// `true` when the result is the JSON literal `true`.
pub fn is_true(result: &[u8]) -> bool {
    matches!(serde_json::from_slice::<Value>(result), Ok(Value::Bool(true)))
}
