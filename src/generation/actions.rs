//! Editor-facing actions: run a generation request for a scene and write the
//! result back into the store.
//!
//! Every action reports an `ActionOutcome` instead of an error so callers can
//! show the message directly. A failed or cancelled action leaves the store
//! untouched.

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::{ErrorClass, GenerationError, GenerationResult, StoryflowError};
use crate::generation::client::GenerationClient;
use crate::generation::provider::MediaProvider;
use crate::storyboard::model::{AudioPatch, Visual};
use crate::storyboard::store::StoryboardStore;

/// Result of an editor action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_uri: Option<String>,
    #[serde(skip)]
    pub error_class: Option<ErrorClass>,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>, data_uri: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data_uri,
            error_class: None,
        }
    }

    pub fn failure(error: &GenerationError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            data_uri: None,
            error_class: Some(error.class()),
        }
    }
}

impl From<GenerationResult<String>> for ActionOutcome {
    fn from(result: GenerationResult<String>) -> Self {
        match result {
            Ok(uri) => Self::success("Generation complete", Some(uri)),
            Err(err) => Self::failure(&err),
        }
    }
}

fn unknown_scene(id: &str) -> ActionOutcome {
    ActionOutcome {
        success: false,
        message: StoryflowError::scene_not_found(id).to_string(),
        data_uri: None,
        error_class: Some(ErrorClass::Validation),
    }
}

/// Synthesizes narration for one scene and stores the audio reference.
pub async fn narrate_scene<P: MediaProvider>(
    client: &GenerationClient<P>,
    store: &mut StoryboardStore,
    scene_id: &str,
) -> ActionOutcome {
    let Some(scene) = store.scene(scene_id) else {
        return unknown_scene(scene_id);
    };
    let script = scene.audio.script_text().to_string();
    let voice = scene.audio.voice_id().to_string();

    match client.synthesize_speech(&script, &voice).await {
        Ok(uri) => {
            store.update_scene_audio(scene_id, AudioPatch::new().with_url(uri.clone()));
            ActionOutcome::success("Audio generated", Some(uri))
        }
        Err(err) => {
            tracing::warn!(scene_id, error = %err, "narration failed");
            ActionOutcome::failure(&err)
        }
    }
}

/// Narrates every scene still missing audio, stopping at the first failure.
pub async fn narrate_all<P: MediaProvider>(
    client: &GenerationClient<P>,
    store: &mut StoryboardStore,
) -> ActionOutcome {
    let pending: Vec<String> = store
        .scenes_missing_audio()
        .into_iter()
        .map(str::to_string)
        .collect();
    for id in &pending {
        let outcome = narrate_scene(client, store, id).await;
        if !outcome.success {
            return outcome;
        }
    }
    ActionOutcome::success(format!("Audio generated for {} scene(s)", pending.len()), None)
}

/// Generates a clip from a prompt and installs it as the scene's visual.
///
/// The result is discarded if the token was cancelled in the meantime.
pub async fn generate_scene_visual<P: MediaProvider>(
    client: &GenerationClient<P>,
    store: &mut StoryboardStore,
    scene_id: &str,
    prompt: &str,
    cancel: &CancellationToken,
) -> ActionOutcome {
    let Some(scene) = store.scene(scene_id) else {
        return unknown_scene(scene_id);
    };
    let duration = scene.duration;

    match client
        .generate_video_with_duration(prompt, duration, cancel)
        .await
    {
        Ok(_) if cancel.is_cancelled() => ActionOutcome::failure(&GenerationError::Cancelled),
        Ok(uri) => {
            store.update_scene_visual(scene_id, Visual::generated(prompt.trim(), uri.clone()));
            ActionOutcome::success("Video generated", Some(uri))
        }
        Err(err) => {
            tracing::warn!(scene_id, error = %err, "visual generation failed");
            ActionOutcome::failure(&err)
        }
    }
}

/// Compiles the whole storyboard into one video. The store is only read.
pub async fn compile<P: MediaProvider>(
    client: &GenerationClient<P>,
    store: &StoryboardStore,
    cancel: &CancellationToken,
) -> ActionOutcome {
    match client.compile_storyboard(store.scenes(), cancel).await {
        Ok(uri) => ActionOutcome::success("Storyboard compiled", Some(uri)),
        Err(err) => {
            tracing::warn!(error = %err, "compile failed");
            ActionOutcome::failure(&err)
        }
    }
}
