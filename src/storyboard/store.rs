//! StoryboardStore: the single owner of the ordered scene collection.
//!
//! Every mutator leaves `order_index` values dense and increasing from 0.
//! Mutating an unknown scene id is a no-op reported through the `bool` return,
//! never an error.

use uuid::Uuid;

use crate::error::{GenerationError, GenerationResult, StoryflowError, StoryflowResult};
use crate::storyboard::model::*;

/// Change notification emitted after each applied mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added { id: String, order_index: usize },
    Updated { id: String },
    Deleted { id: String },
    Moved { id: String, order_index: usize },
}

impl StoreEvent {
    /// Id of the scene the event refers to.
    pub fn scene_id(&self) -> &str {
        match self {
            Self::Added { id, .. }
            | Self::Updated { id }
            | Self::Deleted { id }
            | Self::Moved { id, .. } => id,
        }
    }
}

type Listener = Box<dyn FnMut(&StoreEvent, &[Scene])>;

// =============================================================================
// STORYBOARD STORE
// =============================================================================

/// In-memory storyboard for one editing session.
///
/// Scenes are held in render order; `scenes()[i].order_index == i` at all times.
#[derive(Default)]
pub struct StoryboardStore {
    scenes: Vec<Scene>,
    revision: u64,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for StoryboardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryboardStore")
            .field("scenes", &self.scenes)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl StoryboardStore {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates an empty storyboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storyboard from scenes in any order.
    ///
    /// Scenes are sorted by their incoming `order_index` (ties keep input order)
    /// and then renumbered densely. Duplicate ids are rejected.
    pub fn from_scenes(mut scenes: Vec<Scene>) -> StoryflowResult<Self> {
        for (i, scene) in scenes.iter().enumerate() {
            if scenes[..i].iter().any(|s| s.id == scene.id) {
                return Err(StoryflowError::invalid_storyboard(format!(
                    "duplicate scene id '{}'",
                    scene.id
                )));
            }
            if scene.duration == 0 {
                return Err(StoryflowError::invalid_storyboard(format!(
                    "scene '{}' has zero duration",
                    scene.id
                )));
            }
        }
        scenes.sort_by_key(|s| s.order_index);
        let mut store = Self {
            scenes,
            ..Default::default()
        };
        store.reindex(0);
        Ok(store)
    }

    /// Creates the two-scene storyboard a new editing session opens with.
    pub fn with_initial_scenes() -> Self {
        let welcome = crate::storyboard::catalog::STOCK_VIDEOS
            .first()
            .map(Visual::stock)
            .unwrap_or_default();
        let scenes = vec![
            Scene::new("scene-1", 0).with_audio(Audio::tts(
                "In a world of generative art, one tool stands out.",
                "male-narrator",
            )),
            Scene::new("scene-2", 1)
                .with_duration(8)
                .with_visual(welcome)
                .with_audio(Audio::tts(
                    "Welcome to StoryFlow Studio, where your ideas come to life. \
                     Effortlessly create stunning videos with the power of AI.",
                    "female-energetic",
                )),
        ];
        Self {
            scenes,
            ..Default::default()
        }
    }

    /// Parses a storyboard from a JSON array of scenes.
    pub fn from_json(json: &str) -> StoryflowResult<Self> {
        let scenes: Vec<Scene> = serde_json::from_str(json)?;
        Self::from_scenes(scenes)
    }

    /// Serializes the scenes, in order, as a JSON array.
    pub fn to_json(&self) -> StoryflowResult<String> {
        Ok(serde_json::to_string_pretty(&self.scenes)?)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Scenes in render/compilation order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Gets a scene by id.
    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Counter bumped once per applied mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Sum of all scene durations, in seconds. Saturates at `u32::MAX`.
    pub fn total_duration(&self) -> u32 {
        total_duration(&self.scenes)
    }

    /// Ids of scenes whose narration has not been synthesized yet.
    pub fn scenes_missing_audio(&self) -> Vec<&str> {
        self.scenes
            .iter()
            .filter(|s| !s.has_audio())
            .map(|s| s.id.as_str())
            .collect()
    }

    /// Pre-flight check for compilation: non-empty and every scene has audio.
    pub fn check_compilable(&self) -> GenerationResult<()> {
        check_compilable(&self.scenes)
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Registers a listener called after every applied mutation.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&StoreEvent, &[Scene]) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Inserts a default scene right after the scene at `after_index`.
    ///
    /// `None` inserts at the front; an index past the end appends.
    /// Returns the new scene's id.
    pub fn add_scene(&mut self, after_index: Option<usize>) -> String {
        let position = match after_index {
            None => 0,
            Some(i) => i.saturating_add(1).min(self.scenes.len()),
        };
        let id = format!("scene-{}", Uuid::new_v4());
        self.scenes.insert(position, Scene::new(id.clone(), position));
        self.reindex(position + 1);

        tracing::debug!(scene_id = %id, order_index = position, "scene added");
        self.notify(StoreEvent::Added {
            id: id.clone(),
            order_index: position,
        });
        id
    }

    /// Removes a scene and closes the gap it leaves.
    ///
    /// Returns false (and changes nothing) if the id is unknown.
    pub fn delete_scene(&mut self, id: &str) -> bool {
        let Some(position) = self.position(id) else {
            tracing::warn!(scene_id = %id, "delete ignored: unknown scene");
            return false;
        };
        self.scenes.remove(position);
        self.reindex(position);

        tracing::debug!(scene_id = %id, "scene deleted");
        self.notify(StoreEvent::Deleted { id: id.to_string() });
        true
    }

    /// Moves a scene to a new position (clamped to the last slot).
    ///
    /// Returns false if the id is unknown.
    pub fn move_scene(&mut self, id: &str, to_index: usize) -> bool {
        let Some(from) = self.position(id) else {
            tracing::warn!(scene_id = %id, "move ignored: unknown scene");
            return false;
        };
        let to = to_index.min(self.scenes.len() - 1);
        if from == to {
            return true;
        }
        let scene = self.scenes.remove(from);
        self.scenes.insert(to, scene);
        self.reindex(from.min(to));

        tracing::debug!(scene_id = %id, from, to, "scene moved");
        self.notify(StoreEvent::Moved {
            id: id.to_string(),
            order_index: to,
        });
        true
    }

    /// Merges a partial field set into a scene.
    ///
    /// Returns false if the id is unknown or the patch wrote nothing.
    pub fn update_scene(&mut self, id: &str, patch: ScenePatch) -> bool {
        self.update_scene_with(id, |_| patch)
    }

    /// Merges the patch computed from the scene's current value.
    ///
    /// The closure sees the scene as it is at application time, which makes
    /// nested merges (e.g. into `audio`) safe against intervening edits.
    pub fn update_scene_with<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&Scene) -> ScenePatch,
    {
        let Some(position) = self.position(id) else {
            tracing::warn!(scene_id = %id, "update ignored: unknown scene");
            return false;
        };
        let patch = f(&self.scenes[position]);
        if patch.is_empty() || !self.scenes[position].apply(patch) {
            return false;
        }
        self.notify(StoreEvent::Updated { id: id.to_string() });
        true
    }

    /// Replaces a scene's visual wholesale.
    pub fn update_scene_visual(&mut self, id: &str, visual: Visual) -> bool {
        self.update_scene(id, ScenePatch::new().with_visual(visual))
    }

    /// Merges partial audio fields, keeping every audio field the patch leaves unset.
    pub fn update_scene_audio(&mut self, id: &str, patch: AudioPatch) -> bool {
        self.update_scene_with(id, |scene| {
            let mut audio = scene.audio.clone();
            if audio.merge(patch) {
                ScenePatch::new().with_audio(audio)
            } else {
                ScenePatch::new()
            }
        })
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn position(&self, id: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.id == id)
    }

    /// Rewrites `order_index` from `start` to the end of the list.
    fn reindex(&mut self, start: usize) {
        for (i, scene) in self.scenes.iter_mut().enumerate().skip(start) {
            scene.order_index = i;
        }
    }

    fn notify(&mut self, event: StoreEvent) {
        self.revision += 1;
        tracing::trace!(scene_id = event.scene_id(), revision = self.revision, "store changed");
        for listener in &mut self.listeners {
            listener(&event, &self.scenes);
        }
    }
}

/// Sum of scene durations in seconds, saturating instead of overflowing.
pub fn total_duration(scenes: &[Scene]) -> u32 {
    scenes
        .iter()
        .fold(0u32, |total, s| total.saturating_add(s.duration))
}

/// Pre-flight check for compiling a scene list.
pub fn check_compilable(scenes: &[Scene]) -> GenerationResult<()> {
    if scenes.is_empty() {
        return Err(GenerationError::EmptyStoryboard);
    }
    let missing: Vec<String> = scenes
        .iter()
        .filter(|s| !s.has_audio())
        .map(|s| s.id.clone())
        .collect();
    if !missing.is_empty() {
        return Err(GenerationError::AudioMissing { scene_ids: missing });
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
