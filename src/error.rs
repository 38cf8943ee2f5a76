//! Error types for the storyboard store and the generation client.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for storyboard operations.
pub type StoryflowResult<T> = Result<T, StoryflowError>;

/// Result type alias for generation requests.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors raised outside the in-memory mutators (import, export, configuration).
///
/// Store mutators never return these: operating on an unknown scene is a no-op.
#[derive(Error, Debug)]
pub enum StoryflowError {
    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while reading or writing a storyboard or config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene not found in the storyboard.
    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    /// Storyboard data violates an invariant that cannot be repaired on import.
    #[error("Invalid storyboard: {0}")]
    InvalidStoryboard(String),

    /// Configuration value out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl StoryflowError {
    /// Creates a SceneNotFound error.
    pub fn scene_not_found(id: impl Into<String>) -> Self {
        Self::SceneNotFound(id.into())
    }

    /// Creates an InvalidStoryboard error.
    pub fn invalid_storyboard(msg: impl Into<String>) -> Self {
        Self::InvalidStoryboard(msg.into())
    }

    /// Creates an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Broad failure classes surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Empty or unusable input, rejected before any network call.
    Validation,
    /// The external model broke its contract (no handle, no media, job error).
    ContractViolation,
    /// Network or HTTP failure.
    Transport,
    /// A required precondition such as the access credential is missing.
    Precondition,
    /// The request was stopped locally (deadline or cancellation).
    Aborted,
}

/// Failures of a generation request. None of these are retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// A required text input was empty.
    #[error("{0} must not be empty")]
    EmptyInput(String),

    /// Voice persona id not present in the catalog.
    #[error("Unknown voice persona: {0}")]
    UnknownVoice(String),

    /// Voice persona exists but has no provider voice behind it.
    #[error("Voice persona '{0}' is not configured for speech synthesis")]
    VoiceNotConfigured(String),

    /// Compilation requested for a storyboard without scenes.
    #[error("Storyboard has no scenes to compile")]
    EmptyStoryboard,

    /// Compilation requested while some scenes have no synthesized audio.
    #[error("Audio has not been generated for {} scene(s): {}", .scene_ids.len(), .scene_ids.join(", "))]
    AudioMissing { scene_ids: Vec<String> },

    /// Provider accepted the request but returned no job handle.
    #[error("Expected the model to return an operation")]
    MissingOperation,

    /// The job finished in an error state.
    #[error("Failed to generate video: {0}")]
    JobFailed(String),

    /// The job finished without any media artifact.
    #[error("Failed to find the generated media")]
    NoMedia,

    /// Media download returned a non-success status.
    #[error("Failed to fetch media: HTTP {status}")]
    Download { status: u16 },

    /// Media download succeeded but carried no body.
    #[error("Failed to fetch media: empty response body")]
    MissingBody,

    /// Access credential not available to the process.
    #[error("{0} is required to contact the generation provider")]
    MissingCredential(String),

    /// Poll loop exceeded its attempt budget or wall-clock deadline.
    #[error("Generation job did not finish after {attempts} status checks ({elapsed:?})")]
    Timeout { attempts: u32, elapsed: Duration },

    /// The caller cancelled the request; any late result was discarded.
    #[error("Generation request was cancelled")]
    Cancelled,

    /// Provider API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Network failure talking to the provider.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Provider payload was well-formed but not what the API promises.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Creates an EmptyInput error.
    pub fn empty_input(field: impl Into<String>) -> Self {
        Self::EmptyInput(field.into())
    }

    /// Creates a JobFailed error.
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    /// Creates a MissingCredential error.
    pub fn missing_credential(var: impl Into<String>) -> Self {
        Self::MissingCredential(var.into())
    }

    /// Creates a Transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates an InvalidResponse error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Classifies the error for user-facing reporting.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::EmptyInput(_)
            | Self::UnknownVoice(_)
            | Self::VoiceNotConfigured(_)
            | Self::EmptyStoryboard
            | Self::AudioMissing { .. } => ErrorClass::Validation,
            Self::MissingOperation
            | Self::JobFailed(_)
            | Self::NoMedia
            | Self::InvalidResponse(_)
            | Self::Decode(_) => ErrorClass::ContractViolation,
            Self::Download { .. } | Self::MissingBody | Self::Api { .. } | Self::Transport(_) => {
                ErrorClass::Transport
            }
            Self::MissingCredential(_) => ErrorClass::Precondition,
            Self::Timeout { .. } | Self::Cancelled => ErrorClass::Aborted,
        }
    }
}
