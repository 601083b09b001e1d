use std::fmt;

use object_store::path::Path as StorePath;

use super::TranscriptionJobId;

/// Logical areas of the object store the pipeline reads from and writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Recordings,
    Transcripts,
    ProcessedAudio,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Recordings => "recordings",
            Namespace::Transcripts => "transcripts",
            Namespace::ProcessedAudio => "processed_audio",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object name within a namespace. Gateways resolve the namespace to a
/// concrete container or prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobPath {
    namespace: Namespace,
    name: String,
}

impl BlobPath {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    pub fn transcript(job_id: &TranscriptionJobId) -> Self {
        Self::new(Namespace::Transcripts, format!("{}.json", job_id))
    }

    /// Recording blob addressed by a (possibly signed) URL. The blob keeps
    /// the URL's final path segment, percent-decoded, as its name; the query
    /// string is dropped.
    pub fn recording_from_url(url: &str) -> Option<Self> {
        let without_query = url.split(['?', '#']).next().unwrap_or_default();
        let segment = without_query.trim_end_matches('/').rsplit('/').next()?;
        if segment.is_empty() || segment.contains(':') {
            return None;
        }
        let decoded = StorePath::from_url_path(segment).ok()?;
        let name = decoded.filename()?;
        Some(Self::new(Namespace::Recordings, name))
    }

    /// Same object name relocated to another namespace.
    pub fn relocate(&self, namespace: Namespace) -> Self {
        Self::new(namespace, self.name.clone())
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
