use scribeflow::domain::{TranscriptionJob, TranscriptionStatus};

#[test]
fn given_service_listing_entry_when_deserializing_then_reads_results_urls() {
    let json = r#"{
        "id": "9b1c",
        "name": "call-17.wav",
        "recordingsUrl": "https://account.blob.test/recordings/call-17.wav?sig=abc",
        "locale": "en-US",
        "status": "SUCCEEDED",
        "resultsUrls": {
            "channel_1": "https://speech.test/results/1",
            "channel_0": "https://speech.test/results/0"
        }
    }"#;

    let job: TranscriptionJob = serde_json::from_str(json).unwrap();

    assert_eq!(job.id.as_str(), "9b1c");
    assert_eq!(job.status, TranscriptionStatus::Succeeded);
    let channels: Vec<&str> = job.result_urls.keys().map(String::as_str).collect();
    assert_eq!(channels, vec!["channel_0", "channel_1"]);
    assert!(job.has_results());
}

#[test]
fn given_running_job_without_results_when_deserializing_then_has_no_results() {
    let json = r#"{
        "id": "a1",
        "recordingsUrl": "https://account.blob.test/recordings/a1.wav",
        "status": "Running"
    }"#;

    let job: TranscriptionJob = serde_json::from_str(json).unwrap();

    assert!(job.result_urls.is_empty());
    assert!(!job.has_results());
}
