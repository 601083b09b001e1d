use scribeflow::application::orchestration::summarize_input;
use serde_json::json;

#[test]
fn given_null_input_when_summarizing_then_returns_none_marker() {
    assert_eq!(summarize_input(&json!(null)), "[NONE]");
}

#[test]
fn given_signed_url_when_summarizing_then_signature_is_redacted() {
    let summary = summarize_input(&json!(
        "https://account.blob.test/recordings/a.wav?sv=2020&sig=abc123&se=2030"
    ));

    assert_eq!(
        summary,
        "https://account.blob.test/recordings/a.wav?sv=2020&sig=[REDACTED]&se=2030"
    );
}

#[test]
fn given_repeated_secrets_when_summarizing_then_every_occurrence_is_redacted() {
    let summary = summarize_input(&json!({"a": "x?token=one", "b": "y?token=two"}));

    assert!(!summary.contains("one"));
    assert!(!summary.contains("two"));
    assert_eq!(summary.matches("[REDACTED]").count(), 2);
}

#[test]
fn given_long_input_when_summarizing_then_truncated_with_total_length() {
    let long = "a".repeat(300);

    let summary = summarize_input(&json!(long));

    assert!(summary.starts_with(&"a".repeat(120)));
    assert!(summary.ends_with("... (300 chars total)"));
}
