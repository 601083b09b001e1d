use serde_json::Value;

const MAX_VISIBLE_LENGTH: usize = 120;

/// Renders an activity input for logging: truncated, with credentials in
/// signed URLs masked.
pub fn summarize_input(input: &Value) -> String {
    let rendered = match input {
        Value::Null => return String::from("[NONE]"),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let redacted = redact_sensitive_patterns(rendered.trim());

    if redacted.chars().count() > MAX_VISIBLE_LENGTH {
        let visible: String = redacted.chars().take(MAX_VISIBLE_LENGTH).collect();
        format!("{}... ({} chars total)", visible, redacted.chars().count())
    } else {
        redacted
    }
}

fn redact_sensitive_patterns(text: &str) -> String {
    let patterns = ["sig=", "token=", "api_key=", "password=", "secret="];

    let mut result = text.to_string();
    for pattern in patterns {
        let mut search_from = 0;
        while let Some(found) = result[search_from..].find(pattern) {
            let start = search_from + found + pattern.len();
            let end = result[start..]
                .find(|c: char| c.is_whitespace() || c == '&' || c == '"' || c == '\'')
                .map(|i| start + i)
                .unwrap_or(result.len());
            result.replace_range(start..end, "[REDACTED]");
            search_from = start + "[REDACTED]".len();
        }
    }

    result
}
