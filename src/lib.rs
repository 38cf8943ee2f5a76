//! Storyflow - storyboard editor core for narrated short videos.
//!
//! A storyboard is an ordered list of scenes, each pairing a visual (stock
//! clip, generated clip, or nothing yet) with a text-to-speech narration.
//!
//! - **Store**: `StoryboardStore` owns the scenes and keeps `order_index`
//!   dense across add, delete, move and partial updates
//! - **Generation**: `GenerationClient` turns scripts into narration and
//!   prompts or whole storyboards into video, via call-and-poll jobs
//!
//! # Example
//!
//! ```rust
//! use storyflow::{AudioPatch, StoryboardStore};
//!
//! let mut store = StoryboardStore::with_initial_scenes();
//!
//! // Insert after the first scene; the old second scene shifts to index 2
//! let id = store.add_scene(Some(0));
//! assert_eq!(store.scene(&id).unwrap().order_index, 1);
//!
//! // Partial audio edits keep the fields they don't mention
//! store.update_scene_audio(&id, AudioPatch::new().with_script_text("A new beginning."));
//! assert_eq!(store.scene(&id).unwrap().audio.voice_id(), "male-deep");
//!
//! // Unknown ids are a no-op
//! assert!(!store.delete_scene("missing"));
//! ```

pub mod config;
pub mod error;
pub mod storyboard;

#[cfg(feature = "generation")]
pub mod generation;

// Re-exports for convenience
pub use config::{GenerationConfig, API_KEY_ENV, MAX_VIDEO_SECONDS};
pub use error::{ErrorClass, GenerationError, GenerationResult, StoryflowError, StoryflowResult};
pub use storyboard::{
    check_compilable, Audio, AudioPatch, Scene, ScenePatch, StockVideo, StoreEvent,
    StoryboardStore, Visual, VoicePersona, STOCK_VIDEOS, VOICE_PERSONAS,
};

#[cfg(feature = "generation")]
pub use generation::{ActionOutcome, CancellationToken, GenerationClient, MediaProvider};

#[cfg(feature = "gemini")]
pub use generation::GeminiProvider;

#[cfg(feature = "wasm")]
pub use storyboard::JsStoryboardStore;
