//! The provider boundary: capabilities the generation client needs from an
//! external model API.

use async_trait::async_trait;

use crate::error::GenerationResult;

/// Speech synthesis input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    /// Prebuilt provider voice (not the persona id).
    pub voice_name: String,
}

/// Video job submission input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoJobRequest {
    pub prompt: String,
    /// Already capped by the caller.
    pub duration_seconds: u32,
    pub aspect_ratio: String,
}

/// Location of a media artifact produced by a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub url: String,
    pub content_type: Option<String>,
}

impl MediaReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: None,
        }
    }

    /// Builder: Set content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Status snapshot of an asynchronous job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobHandle {
    /// Provider-assigned operation name, used for status checks.
    pub name: String,
    pub done: bool,
    /// Error message reported by the job, if it failed.
    pub error: Option<String>,
    /// Media produced by the job, if it succeeded.
    pub media: Vec<MediaReference>,
}

impl JobHandle {
    /// A freshly submitted, unfinished job.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: Mark finished with media.
    pub fn with_media(mut self, media: MediaReference) -> Self {
        self.done = true;
        self.media.push(media);
        self
    }

    /// Builder: Mark finished with an error.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.done = true;
        self.error = Some(message.into());
        self
    }
}

/// Downloaded media bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// External generative model operations.
///
/// Implementations report transport-level failures; classifying job outcomes
/// (missing handle, job error, no media) is the client's job.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Synthesizes speech and returns headerless 16-bit mono PCM at 24 kHz.
    async fn synthesize_speech(&self, request: &SpeechRequest) -> GenerationResult<Vec<u8>>;

    /// Submits a video job. `None` means the provider returned no operation.
    async fn submit_video_job(&self, request: &VideoJobRequest)
        -> GenerationResult<Option<JobHandle>>;

    /// Fetches the current status of a job.
    async fn poll_video_job(&self, handle: &JobHandle) -> GenerationResult<JobHandle>;

    /// Downloads a media artifact (authenticated).
    async fn fetch_media(&self, media: &MediaReference) -> GenerationResult<FetchedMedia>;
}
