//! Storyboard module: scene model, static catalogs and the scene store.
//!
//! This module provides:
//! - `model`: Scene, Visual, Audio and patch types
//! - `catalog`: voice personas and stock video clips
//! - `store`: StoryboardStore with ordered add/update/delete/move operations
//! - `wasm`: WASM bindings for browser usage (JsStoryboardStore)

pub mod catalog;
pub mod model;
pub mod store;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use catalog::{STOCK_VIDEOS, VOICE_PERSONAS};
pub use model::*;
pub use store::{check_compilable, StoreEvent, StoryboardStore};

#[cfg(feature = "wasm")]
pub use wasm::JsStoryboardStore;
