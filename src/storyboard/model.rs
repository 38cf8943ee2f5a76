//! Data models for the storyboard store.
//!
//! The JSON shape (camelCase fields, `type`-tagged visual/audio objects) matches
//! what the browser editor exchanges with the store.

use serde::{Deserialize, Deserializer, Serialize};

/// Duration given to freshly inserted scenes, in seconds.
pub const DEFAULT_SCENE_DURATION: u32 = 5;

/// Voice persona assigned to freshly inserted scenes.
pub const DEFAULT_VOICE_ID: &str = "male-deep";

// =============================================================================
// SCENE
// =============================================================================

/// One storyboard unit pairing a visual and a narrated audio track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Opaque identifier, stable for the scene's lifetime.
    pub id: String,
    /// Position among sibling scenes. Owned by the store.
    pub order_index: usize,
    /// Length in seconds, always positive.
    pub duration: u32,
    pub visual: Visual,
    pub audio: Audio,
}

impl Scene {
    /// Creates a scene with default content at the given position.
    pub fn new(id: impl Into<String>, order_index: usize) -> Self {
        Self {
            id: id.into(),
            order_index,
            duration: DEFAULT_SCENE_DURATION,
            visual: Visual::Empty,
            audio: Audio::default(),
        }
    }

    /// Builder: Set duration (zero is ignored).
    pub fn with_duration(mut self, duration: u32) -> Self {
        if duration > 0 {
            self.duration = duration;
        }
        self
    }

    /// Builder: Set visual.
    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = visual;
        self
    }

    /// Builder: Set audio.
    pub fn with_audio(mut self, audio: Audio) -> Self {
        self.audio = audio;
        self
    }

    /// Builder: Set narration script.
    pub fn with_script(mut self, script_text: impl Into<String>) -> Self {
        self.audio.merge(AudioPatch::new().with_script_text(script_text));
        self
    }

    /// Returns true once narration audio has been synthesized for this scene.
    pub fn has_audio(&self) -> bool {
        self.audio.url().is_some_and(|url| !url.trim().is_empty())
    }

    /// Merges a patch into this scene. `id` and `order_index` are never touched.
    ///
    /// Returns true if any field was written.
    pub fn apply(&mut self, patch: ScenePatch) -> bool {
        let mut changed = false;
        if let Some(duration) = patch.duration {
            if duration > 0 {
                self.duration = duration;
                changed = true;
            } else {
                tracing::warn!(scene_id = %self.id, "ignoring zero scene duration");
            }
        }
        if let Some(visual) = patch.visual {
            self.visual = visual;
            changed = true;
        }
        if let Some(audio) = patch.audio {
            self.audio = audio;
            changed = true;
        }
        changed
    }
}

/// Partial field set merged into a scene by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenePatch {
    pub duration: Option<u32>,
    pub visual: Option<Visual>,
    pub audio: Option<Audio>,
}

impl ScenePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Set duration.
    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Builder: Replace the visual.
    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = Some(visual);
        self
    }

    /// Builder: Replace the audio.
    pub fn with_audio(mut self, audio: Audio) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Returns true if the patch carries no fields.
    pub fn is_empty(&self) -> bool {
        self.duration.is_none() && self.visual.is_none() && self.audio.is_none()
    }
}

// =============================================================================
// VISUAL
// =============================================================================

/// The visual half of a scene.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Visual {
    /// Nothing selected yet.
    #[default]
    Empty,
    /// A clip from the stock catalog.
    Stock {
        #[serde(default, rename = "stockId", skip_serializing_if = "Option::is_none")]
        stock_id: Option<String>,
        url: String,
        #[serde(rename = "thumbnailUrl")]
        thumbnail_url: String,
    },
    /// User upload. Selection exists in the editor but uploading is not implemented.
    Upload,
    /// A clip produced by the video model from a prompt.
    Generated { prompt: String, url: String },
}

impl Visual {
    /// Creates a stock visual from a catalog entry.
    pub fn stock(video: &StockVideo) -> Self {
        Self::Stock {
            stock_id: Some(video.id.to_string()),
            url: video.url.to_string(),
            thumbnail_url: video.thumbnail_url.to_string(),
        }
    }

    /// Creates a generated visual.
    pub fn generated(prompt: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Generated {
            prompt: prompt.into(),
            url: url.into(),
        }
    }

    /// Playable media reference, if the variant has one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Stock { url, .. } | Self::Generated { url, .. } => Some(url),
            Self::Empty | Self::Upload => None,
        }
    }

    /// Thumbnail reference (stock only).
    pub fn thumbnail_url(&self) -> Option<&str> {
        match self {
            Self::Stock { thumbnail_url, .. } => Some(thumbnail_url),
            _ => None,
        }
    }

    /// Generation prompt (generated only).
    pub fn prompt(&self) -> Option<&str> {
        match self {
            Self::Generated { prompt, .. } => Some(prompt),
            _ => None,
        }
    }

    /// The `type` tag as it appears in JSON.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Stock { .. } => "stock",
            Self::Upload => "upload",
            Self::Generated { .. } => "generated",
        }
    }
}

// =============================================================================
// AUDIO
// =============================================================================

/// The narration half of a scene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Audio {
    /// Text-to-speech narration.
    Tts(TtsAudio),
}

impl Default for Audio {
    fn default() -> Self {
        Self::Tts(TtsAudio::default())
    }
}

impl Audio {
    /// Creates TTS audio with a script and voice, not yet synthesized.
    pub fn tts(script_text: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self::Tts(TtsAudio {
            script_text: script_text.into(),
            voice_id: voice_id.into(),
            url: None,
        })
    }

    pub fn script_text(&self) -> &str {
        match self {
            Self::Tts(tts) => &tts.script_text,
        }
    }

    pub fn voice_id(&self) -> &str {
        match self {
            Self::Tts(tts) => &tts.voice_id,
        }
    }

    /// Synthesized audio reference, once generated.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Tts(tts) => tts.url.as_deref(),
        }
    }

    /// Merges patch fields, keeping every field the patch leaves unset.
    ///
    /// Returns true if any field was written.
    pub fn merge(&mut self, patch: AudioPatch) -> bool {
        match self {
            Self::Tts(tts) => {
                let mut changed = false;
                if let Some(script_text) = patch.script_text {
                    tts.script_text = script_text;
                    changed = true;
                }
                if let Some(voice_id) = patch.voice_id {
                    tts.voice_id = voice_id;
                    changed = true;
                }
                if let Some(url) = patch.url {
                    tts.url = url;
                    changed = true;
                }
                changed
            }
        }
    }
}

/// Text-to-speech narration settings and result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TtsAudio {
    #[serde(default)]
    pub script_text: String,
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for TtsAudio {
    fn default() -> Self {
        Self {
            script_text: String::new(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            url: None,
        }
    }
}

/// Partial audio fields. `url: Some(None)` clears a synthesized result.
///
/// In JSON an absent `url` leaves the result alone and `"url": null` clears it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioPatch {
    pub script_text: Option<String>,
    pub voice_id: Option<String>,
    #[serde(deserialize_with = "present_or_null")]
    pub url: Option<Option<String>>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl AudioPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Set script text.
    pub fn with_script_text(mut self, script_text: impl Into<String>) -> Self {
        self.script_text = Some(script_text.into());
        self
    }

    /// Builder: Set voice persona id.
    pub fn with_voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    /// Builder: Set synthesized audio reference.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(Some(url.into()));
        self
    }

    /// Builder: Clear the synthesized audio reference.
    pub fn clear_url(mut self) -> Self {
        self.url = Some(None);
        self
    }
}

// =============================================================================
// CATALOG ENTRIES
// =============================================================================

/// Gender tag on a voice persona.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

/// Named preset selecting a synthetic narration voice.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoicePersona {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub gender: Gender,
    /// Prebuilt provider voice; `None` when the persona cannot be synthesized.
    pub api_voice_name: Option<&'static str>,
}

/// Pre-catalogued video asset selectable as a scene's visual.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockVideo {
    pub id: &'static str,
    pub url: &'static str,
    pub thumbnail_url: &'static str,
    pub description: &'static str,
    pub image_hint: Option<&'static str>,
}

// =============================================================================
// TESTS
// =============================================================================
