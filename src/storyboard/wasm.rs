//! WASM bindings for the storyboard store.
//!
//! JavaScript-friendly wrapper around StoryboardStore for the browser editor.
//! Scenes cross the boundary as plain objects in the same camelCase JSON shape
//! the editor uses.

use js_sys::Function;
use serde::Serialize;
use serde_json::json;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

use crate::storyboard::catalog::{self, STOCK_VIDEOS, VOICE_PERSONAS};
use crate::storyboard::model::*;
use crate::storyboard::store::{StoreEvent, StoryboardStore};
use crate::config::MAX_VIDEO_SECONDS;
use crate::StoryflowError;

/// Serialize a value to JsValue with maps as plain JS objects (not Map).
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::new().serialize_maps_as_objects(true))
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

impl From<StoryflowError> for JsValue {
    fn from(err: StoryflowError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: StoryflowError| JsValue::from(e))
    };
}

fn event_to_js(event: &StoreEvent) -> Result<JsValue, serde_wasm_bindgen::Error> {
    let value = match event {
        StoreEvent::Added { id, order_index } => {
            json!({ "kind": "added", "id": id, "orderIndex": order_index })
        }
        StoreEvent::Updated { id } => json!({ "kind": "updated", "id": id }),
        StoreEvent::Deleted { id } => json!({ "kind": "deleted", "id": id }),
        StoreEvent::Moved { id, order_index } => {
            json!({ "kind": "moved", "id": id, "orderIndex": order_index })
        }
    };
    to_js_value(&value)
}

/// Pre-flight summary for the compile button.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompileReadiness<'a> {
    ready: bool,
    message: Option<String>,
    missing_scene_ids: Vec<&'a str>,
    requested_duration: u32,
}

// =============================================================================
// MAIN WRAPPER TYPE
// =============================================================================

/// JavaScript-friendly wrapper around StoryboardStore.
#[wasm_bindgen]
pub struct JsStoryboardStore {
    inner: StoryboardStore,
}

#[wasm_bindgen]
impl JsStoryboardStore {
    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Creates an empty storyboard.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const store = new JsStoryboardStore();
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsStoryboardStore {
        JsStoryboardStore {
            inner: StoryboardStore::new(),
        }
    }

    /// Creates the two-scene storyboard a new session opens with.
    #[wasm_bindgen(js_name = withInitialScenes)]
    pub fn with_initial_scenes() -> JsStoryboardStore {
        JsStoryboardStore {
            inner: StoryboardStore::with_initial_scenes(),
        }
    }

    /// Loads scenes from a JSON array string.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const store = JsStoryboardStore.fromJson(localStorage.getItem('scenes'));
    /// ```
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<JsStoryboardStore, JsValue> {
        let inner = js_result!(StoryboardStore::from_json(json))?;
        Ok(JsStoryboardStore { inner })
    }

    /// Serializes the scenes as a JSON array string.
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        js_result!(self.inner.to_json())
    }

    // =========================================================================
    // STATE ACCESS
    // =========================================================================

    /// Gets the ordered scene list.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// for (const scene of store.getScenes()) console.log(scene.orderIndex, scene.id);
    /// ```
    #[wasm_bindgen(js_name = getScenes)]
    pub fn get_scenes(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.scenes())?)
    }

    /// Gets one scene by id (`undefined` if unknown).
    #[wasm_bindgen(js_name = getScene)]
    pub fn get_scene(&self, id: &str) -> Result<JsValue, JsValue> {
        match self.inner.scene(id) {
            Some(scene) => Ok(to_js_value(scene)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Monotonic change counter; bumps once per applied mutation.
    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> f64 {
        self.inner.revision() as f64
    }

    #[wasm_bindgen(js_name = totalDuration)]
    pub fn total_duration(&self) -> u32 {
        self.inner.total_duration()
    }

    /// Registers a callback invoked as `callback(event, scenes)` after each mutation.
    pub fn subscribe(&mut self, callback: Function) {
        self.inner.subscribe(move |event, scenes| {
            let args = event_to_js(event).and_then(|e| Ok((e, to_js_value(&scenes)?)));
            match args {
                Ok((event, scenes)) => {
                    if let Err(err) = callback.call2(&JsValue::NULL, &event, &scenes) {
                        tracing::warn!(error = ?err, "storyboard subscriber threw");
                    }
                }
                Err(err) => tracing::warn!(error = %err, "failed to serialize store event"),
            }
        });
    }

    // =========================================================================
    // SCENE OPERATIONS
    // =========================================================================

    /// Inserts a default scene after `afterIndex`; a negative index inserts at the front.
    ///
    /// Returns the new scene id.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const id = store.addScene(-1); // first scene
    /// ```
    #[wasm_bindgen(js_name = addScene)]
    pub fn add_scene(&mut self, after_index: i32) -> String {
        let after = usize::try_from(after_index).ok();
        self.inner.add_scene(after)
    }

    /// Deletes a scene. Returns false if the id is unknown.
    #[wasm_bindgen(js_name = deleteScene)]
    pub fn delete_scene(&mut self, id: &str) -> bool {
        self.inner.delete_scene(id)
    }

    /// Moves a scene to a new position. Returns false if the id is unknown.
    #[wasm_bindgen(js_name = moveScene)]
    pub fn move_scene(&mut self, id: &str, to_index: u32) -> bool {
        self.inner.move_scene(id, to_index as usize)
    }

    /// Merges a partial scene object (`duration`, `visual`, `audio`).
    ///
    /// # Example (JavaScript)
    /// ```js
    /// store.updateScene(id, { duration: 8 });
    /// ```
    #[wasm_bindgen(js_name = updateScene)]
    pub fn update_scene(&mut self, id: &str, patch: JsValue) -> Result<bool, JsValue> {
        let patch: ScenePatch = from_value(patch)?;
        Ok(self.inner.update_scene(id, patch))
    }

    /// Merges the patch returned by `updater(currentScene)`.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// store.updateSceneWith(id, (scene) => ({ duration: scene.duration + 1 }));
    /// ```
    #[wasm_bindgen(js_name = updateSceneWith)]
    pub fn update_scene_with(&mut self, id: &str, updater: Function) -> Result<bool, JsValue> {
        let mut failure = None;
        let applied = self.inner.update_scene_with(id, |scene| {
            let patch = to_js_value(scene)
                .map_err(JsValue::from)
                .and_then(|current| updater.call1(&JsValue::NULL, &current))
                .and_then(|value| from_value::<ScenePatch>(value).map_err(JsValue::from));
            patch.unwrap_or_else(|err| {
                failure = Some(err);
                ScenePatch::new()
            })
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(applied),
        }
    }

    /// Replaces a scene's visual.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// store.updateSceneVisual(id, { type: 'generated', prompt: 'a fox', url: dataUri });
    /// ```
    #[wasm_bindgen(js_name = updateSceneVisual)]
    pub fn update_scene_visual(&mut self, id: &str, visual: JsValue) -> Result<bool, JsValue> {
        let visual: Visual = from_value(visual)?;
        Ok(self.inner.update_scene_visual(id, visual))
    }

    /// Selects a catalog stock video as the scene's visual.
    #[wasm_bindgen(js_name = selectStockVideo)]
    pub fn select_stock_video(&mut self, id: &str, stock_id: &str) -> Result<bool, JsValue> {
        let video = catalog::stock_video(stock_id)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown stock video: {}", stock_id)))?;
        Ok(self.inner.update_scene_visual(id, Visual::stock(video)))
    }

    /// Merges partial audio fields; `url: null` clears the synthesized audio.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// store.updateSceneAudio(id, { scriptText: 'New line', url: null });
    /// ```
    #[wasm_bindgen(js_name = updateSceneAudio)]
    pub fn update_scene_audio(&mut self, id: &str, patch: JsValue) -> Result<bool, JsValue> {
        let patch: AudioPatch = from_value(patch)?;
        Ok(self.inner.update_scene_audio(id, patch))
    }

    // =========================================================================
    // CATALOG & COMPILE
    // =========================================================================

    #[wasm_bindgen(js_name = voicePersonas)]
    pub fn voice_personas() -> Result<JsValue, JsValue> {
        Ok(to_js_value(&VOICE_PERSONAS)?)
    }

    #[wasm_bindgen(js_name = stockVideos)]
    pub fn stock_videos() -> Result<JsValue, JsValue> {
        Ok(to_js_value(&STOCK_VIDEOS)?)
    }

    /// Up to three voice persona ids that fit a script.
    #[wasm_bindgen(js_name = suggestVoices)]
    pub fn suggest_voices(script_text: &str) -> Vec<String> {
        catalog::suggest_voices(script_text)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Whether the storyboard can be compiled, and what would be requested.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const { ready, message } = store.compileReadiness();
    /// ```
    #[wasm_bindgen(js_name = compileReadiness)]
    pub fn compile_readiness(&self) -> Result<JsValue, JsValue> {
        let check = self.inner.check_compilable();
        let readiness = CompileReadiness {
            ready: check.is_ok(),
            message: check.err().map(|e| e.to_string()),
            missing_scene_ids: self.inner.scenes_missing_audio(),
            requested_duration: self.inner.total_duration().min(MAX_VIDEO_SECONDS),
        };
        Ok(to_js_value(&readiness)?)
    }
}

impl Default for JsStoryboardStore {
    fn default() -> Self {
        Self::new()
    }
}
