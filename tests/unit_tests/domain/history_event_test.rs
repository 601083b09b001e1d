use scribeflow::domain::{ActivityOutcome, HistoryEvent, hash_input};
use serde_json::json;

#[test]
fn given_equal_inputs_when_hashing_then_hashes_match() {
    assert_eq!(hash_input(&json!({"id": "a"})), hash_input(&json!({"id": "a"})));
}

#[test]
fn given_different_inputs_when_hashing_then_hashes_differ() {
    assert_ne!(hash_input(&json!({"id": "a"})), hash_input(&json!({"id": "b"})));
}

#[test]
fn given_new_event_when_created_then_carries_hash_of_input() {
    let input = json!("https://account.blob.test/recordings/a.wav");

    let event = HistoryEvent::new(
        3,
        "ArchiveRecording",
        input.clone(),
        ActivityOutcome::Succeeded(json!(true)),
        2,
    );

    assert_eq!(event.sequence, 3);
    assert_eq!(event.input_hash, hash_input(&input));
    assert_eq!(event.attempts, 2);
    assert!(event.outcome.is_succeeded());
}

#[test]
fn given_failed_outcome_when_serializing_then_is_tagged() {
    let outcome = ActivityOutcome::Failed("boom".to_string());

    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value, json!({"kind": "failed", "value": "boom"}));
}
