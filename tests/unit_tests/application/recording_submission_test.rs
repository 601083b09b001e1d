use std::sync::Arc;

use scribeflow::application::services::{
    RecordingSubmissionService, SubmissionError, SubmissionSettings,
};

use crate::helpers::{FakeTranscriptionService, FaultyGateway};

fn settings(policy_name: &str) -> SubmissionSettings {
    SubmissionSettings {
        locale: "en-US".to_string(),
        description: "Inbound call".to_string(),
        policy_name: policy_name.to_string(),
    }
}

#[tokio::test]
async fn given_recording_when_submitting_then_service_receives_scoped_url() {
    let service = Arc::new(FakeTranscriptionService::new());
    let gateway = Arc::new(FaultyGateway::new());
    let submission =
        RecordingSubmissionService::new(service.clone(), gateway, settings("transcription_read"));

    let location = submission.submit("call-17.wav").await.unwrap();

    assert_eq!(
        location.as_deref(),
        Some("http://speech.test/transcriptions/call-17.wav")
    );
    let submitted = service.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].locale, "en-US");
    assert_eq!(
        submitted[0].recordings_url,
        "https://account.blob.test/recordings/call-17.wav?policy=transcription_read&expires_in=3600"
    );
}

#[tokio::test]
async fn given_unknown_access_policy_when_submitting_then_signing_error() {
    let service = Arc::new(FakeTranscriptionService::new());
    let gateway = Arc::new(FaultyGateway::new());
    let submission = RecordingSubmissionService::new(service.clone(), gateway, settings("nope"));

    let result = submission.submit("call-17.wav").await;

    assert!(matches!(result, Err(SubmissionError::Signing(_))));
    assert!(service.submitted().is_empty());
}
