//! Generation module: requests to the external speech and video models.
//!
//! This module provides:
//! - `provider`: the `MediaProvider` trait the client talks to
//! - `job`: poll-until-done state machine with deadline and cancellation
//! - `media`: WAV wrapping and `data:` URI helpers
//! - `client`: GenerationClient (speech, single-prompt video, compile)
//! - `actions`: editor actions that write results back into the store
//! - `gemini`: HTTP provider for the Gemini / Veo API

pub mod actions;
pub mod client;
pub mod job;
pub mod media;
pub mod provider;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(test)]
mod testing;

pub use actions::{compile, generate_scene_visual, narrate_all, narrate_scene, ActionOutcome};
pub use client::{compile_directive, compile_duration, GenerationClient};
pub use job::{JobPoller, JobState, PollPolicy};
pub use provider::{FetchedMedia, JobHandle, MediaProvider, MediaReference, SpeechRequest, VideoJobRequest};

#[cfg(feature = "gemini")]
pub use gemini::GeminiProvider;

// Token accepted by the cancellable operations.
pub use tokio_util::sync::CancellationToken;
