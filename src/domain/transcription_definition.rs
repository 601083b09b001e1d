use serde::Serialize;

/// Request body for submitting a recording to the transcription service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionDefinition {
    pub name: String,
    pub description: String,
    pub recordings_url: String,
    pub locale: String,
    pub models: Vec<ModelIdentity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelIdentity {
    pub id: String,
}

impl TranscriptionDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        locale: impl Into<String>,
        recordings_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            recordings_url: recordings_url.into(),
            locale: locale.into(),
            models: Vec::new(),
        }
    }
}
