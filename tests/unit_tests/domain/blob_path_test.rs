use scribeflow::domain::{BlobPath, Namespace, TranscriptionJobId};

#[test]
fn given_signed_recording_url_when_parsing_then_uses_last_segment_without_query() {
    let path = BlobPath::recording_from_url(
        "https://account.blob.test/recordings/call-17.wav?sv=2020&sig=secret",
    )
    .unwrap();

    assert_eq!(path.namespace(), Namespace::Recordings);
    assert_eq!(path.name(), "call-17.wav");
}

#[test]
fn given_percent_encoded_segment_when_parsing_then_name_is_decoded() {
    let bracketed =
        BlobPath::recording_from_url("https://account.blob.test/recordings/take%5B1%5D.wav?se=1")
            .unwrap();
    let spaced =
        BlobPath::recording_from_url("https://account.blob.test/recordings/my%20take.wav").unwrap();

    assert_eq!(bracketed.name(), "take[1].wav");
    assert_eq!(spaced.name(), "my take.wav");
}

#[test]
fn given_url_without_blob_name_when_parsing_then_returns_none() {
    assert!(BlobPath::recording_from_url("").is_none());
    assert!(BlobPath::recording_from_url("https://").is_none());
}

#[test]
fn given_job_id_when_building_transcript_path_then_appends_json_extension() {
    let path = BlobPath::transcript(&TranscriptionJobId::new("9b1c"));

    assert_eq!(path.to_string(), "transcripts/9b1c.json");
}

#[test]
fn given_recording_when_relocating_then_keeps_name() {
    let source = BlobPath::new(Namespace::Recordings, "call-17.wav");

    let target = source.relocate(Namespace::ProcessedAudio);

    assert_eq!(target.to_string(), "processed_audio/call-17.wav");
}
